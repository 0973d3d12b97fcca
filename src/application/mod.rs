// Application layer - Use cases: fetch, decode, scale and the poll loop driving them
pub mod axis_scaler;
pub mod chart_renderer;
pub mod controls;
pub mod poll_loop;
pub mod series_decoder;
pub mod series_fetcher;
