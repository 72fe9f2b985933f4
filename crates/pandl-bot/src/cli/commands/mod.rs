mod capture;
mod folders;
mod probe;
mod run;

pub use capture::run_capture;
pub use folders::run_folders;
pub use probe::run_probe;
pub use run::run_bot;
