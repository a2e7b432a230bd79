//! Mathematical constants at each supported precision.

pub mod f32 {
    /// π
    pub const PI: f32 = 3.14159265358979323846264338327950288f32;
}

pub mod f64 {
    /// π
    pub const PI: f64 = 3.14159265358979323846264338327950288f64;
}
