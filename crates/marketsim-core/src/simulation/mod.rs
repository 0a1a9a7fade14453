pub mod engine;
pub mod path;

pub use engine::{
    run_full_simulation, run_simulation, PathsOutput, SimulationConfig, SimulationInput,
    SimulationOutput,
};
pub use path::{simulate_path, PriceModel};
