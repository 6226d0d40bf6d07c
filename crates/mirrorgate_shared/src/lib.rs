pub mod clip;
pub mod optics;
pub mod pairing;
pub mod surface;
pub mod transform;
