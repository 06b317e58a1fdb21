pub mod program;
pub mod request;
pub mod tags;
pub mod template;

pub use program::{ProgramDay, ProgramWeek, Provenance, TrainingProgram};
pub use request::{DayPatternEntry, ExercisePrescription, GenerateProgramRequest};
pub use tags::{DayOfWeek, ProgressionRule};
pub use template::{TemplateExercise, WorkoutTemplate};
