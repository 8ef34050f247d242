/// widest raw value image a typed operation can move (u64/i64/f64)
pub(crate) const MAX_VALUE_WIDTH: usize = 8;

pub(crate) mod coil {
    /// u16 image of COIL == ON when performing write single coil
    pub(crate) const ON: u16 = 0xFF00;
    /// u16 image of COIL == OFF when performing write single coil
    pub(crate) const OFF: u16 = 0x0000;
}
