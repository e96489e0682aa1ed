pub mod block;
pub mod workout;

pub use block::{Block, BlockStatus, MaxesMap, NewBlock};
pub use workout::{ExercisePrescription, NewPlannedWorkout, NewStage, PlannedWorkout, Reps, Stage};
