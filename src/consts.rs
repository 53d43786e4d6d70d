//! Register map, port encodings, and camera-VI pin constants.
//!
//! Offsets follow the Tegra AP-class GPIO controller layout: eight pins per
//! port, four ports per controller instance, with a masked-write alias bank
//! mirroring the plain registers at a fixed offset.

/// Sentinel port number routed to the camera-VI pin manager.
pub const CAMERA_PORT: u32 = 0xFE;

/// First port number owned by an off-chip GPIO expander. Ports in
/// `EXTERNAL_PORT_BASE..CAMERA_PORT` are handed out without any internal
/// bookkeeping; ownership lives with the external controller.
pub const EXTERNAL_PORT_BASE: u32 = 0xE0;

/// Sentinel for a pin-table entry with no interrupt line assigned.
pub const IRQ_INVALID: u32 = u32::MAX;

/// Sentinel for the end of an interrupt-sharing pin chain.
pub const PIN_NONE: u16 = u16::MAX;

// --- GPIO controller registers ---
pub mod gpio {
    /// Byte stride between the per-port copies of one register field.
    pub const PORT_STRIDE: u32 = 0x04;

    /// Base of the masked-write alias bank. A write to
    /// `MASKED_ALIAS_BASE + offset` updates only the pins whose
    /// write-enable bits are set in the payload.
    pub const MASKED_ALIAS_BASE: u32 = 0x800;

    /// Bit distance between a pin's data bit and its write-enable bit in a
    /// masked-alias payload (the per-register pin-count stride).
    pub const MASK_SHIFT: u32 = 8;

    // Register field offsets within one controller instance.
    pub const REG_CNF: u32 = 0x00; // function select (1 = GPIO, 0 = SFIO)
    pub const REG_OE: u32 = 0x10; // output enable
    pub const REG_OUT: u32 = 0x20; // output data
    pub const REG_IN: u32 = 0x30; // input data
    pub const REG_INT_STA: u32 = 0x40; // interrupt status
    pub const REG_INT_ENB: u32 = 0x50; // interrupt enable
    pub const REG_INT_LVL: u32 = 0x60; // interrupt level/edge/delta
    pub const REG_INT_CLR: u32 = 0x70; // interrupt clear

    // INT_LVL packs three per-pin fields into one 32-bit register.
    /// Shift of the level/polarity bit for pin `n` (bit `n`).
    pub const INT_LVL_BIT_SHIFT: u32 = 0;
    /// Shift of the edge-enable bit for pin `n` (bit `n + 8`).
    pub const INT_LVL_EDGE_SHIFT: u32 = 8;
    /// Shift of the any-edge (delta) bit for pin `n` (bit `n + 16`).
    pub const INT_LVL_DELTA_SHIFT: u32 = 16;
}

// --- Camera-VI registers and pin shifts ---
pub mod vi {
    /// Number of camera-VI GPIO pins (VGP0..VGP6).
    pub const PIN_COUNT: u32 = 7;

    /// VI pin output-enable register.
    pub const REG_OUTPUT_ENABLE: u32 = 0x00;
    /// VI pin output-data register, shadowed in software.
    pub const REG_OUTPUT_DATA: u32 = 0x04;

    /// Base shift of the VGP1/VGP2 pair in the VI pin registers.
    pub const VGP12_SHIFT: u32 = 2;
    /// Base shift of the VGP0, VGP3..VGP6 block in the VI pin registers.
    pub const VGP_AUX_SHIFT: u32 = 4;
    /// Shift returned for a pin index outside the VGP set. Reads through
    /// this shift yield zero and writes are dropped.
    pub const SHIFT_INVALID: u32 = 32;
}

/// Board-discovery GUID of the camera-VI pad voltage rail.
pub const VI_RAIL_GUID: u64 = u64::from_be_bytes(*b"vddcamvi");
