// Domain layer - Pure data types shared by every other layer
pub mod dashboard;
pub mod telemetry;
pub mod topic;
