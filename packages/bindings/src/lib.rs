use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_returns(input_json: String) -> NapiResult<String> {
    let input: marketsim_core::returns::ReturnAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = marketsim_core::returns::analyze_returns(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn run_simulation(input_json: String) -> NapiResult<String> {
    let input: marketsim_core::simulation::SimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = marketsim_core::simulation::run_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_paths(input_json: String) -> NapiResult<String> {
    let input: marketsim_core::simulation::SimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        marketsim_core::simulation::run_full_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_risk(input_json: String) -> NapiResult<String> {
    let input: marketsim_core::risk::RiskInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = marketsim_core::risk::assess_risk(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_stress_test(input_json: String) -> NapiResult<String> {
    let input: marketsim_core::stress::StressTestInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = marketsim_core::stress::run_stress_test(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
