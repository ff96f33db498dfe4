pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod ext;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod source;
pub mod util;
pub mod weight;
pub mod window;
