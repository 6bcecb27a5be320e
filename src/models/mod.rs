pub mod assignment;
pub mod diet_plan;
pub mod engagement;
pub mod goal;
pub mod logs;
pub mod profile;
pub mod system_log;
pub mod user;
pub mod workout_plan;

pub use assignment::*;
pub use diet_plan::*;
pub use engagement::*;
pub use goal::*;
pub use logs::*;
pub use profile::*;
pub use system_log::*;
pub use user::*;
pub use workout_plan::*;
