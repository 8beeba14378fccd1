pub mod dispatch;
pub mod usecase;
