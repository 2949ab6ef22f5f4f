mod blur;

pub use blur::Blur;
