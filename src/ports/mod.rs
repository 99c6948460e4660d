//! Ports (trait boundaries) between the domain and its drivers.
//!
//! Learners, policies, observers and persistence are all expressed as traits
//! here and implemented elsewhere in the crate.

pub mod learner;
pub mod observer;
pub mod policy;
pub mod repository;

pub use learner::Learner;
pub use observer::Observer;
pub use policy::Policy;
pub use repository::LearnerRepository;
