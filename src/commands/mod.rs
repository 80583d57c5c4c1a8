pub mod pdbefold;
pub mod tmalign;
