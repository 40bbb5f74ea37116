//! WASM bridge for the wavefield core library.
//!
//! The browser side owns the canvas, scene graph, orbit controls and the
//! parameter panel; it forwards panel events and resize notifications here
//! and uploads the buffers produced by each frame.

mod ticker;
mod visualization;

pub use visualization::WasmVisualization;

#[cfg(test)]
mod tests {
    use super::WasmVisualization;

    #[test]
    fn visualization_reexport_is_wired() {
        assert!(std::any::type_name::<WasmVisualization>().ends_with("WasmVisualization"));
    }
}
