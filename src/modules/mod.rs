pub mod assignments;
pub mod attendance;
pub mod grades;
pub mod ledger;
pub mod periods;
pub mod subjects;
