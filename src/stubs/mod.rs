pub mod executor;

pub use executor::ExecutorStub;
