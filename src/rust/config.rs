use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::runtime::{OptimizationLevel, RuntimeConfig};

/// Serve product risk predictions over HTTP
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding risk_model.onnx, encoders.json and feature_columns.json
    #[arg(short, long, env = "RISKLENS_MODEL_DIR", default_value = "model")]
    pub model_dir: PathBuf,

    /// ONNX Runtime intra-op threads (0 = runtime default)
    #[arg(long, default_value_t = 0)]
    pub intra_threads: usize,

    /// ONNX Runtime inter-op threads (0 = runtime default)
    #[arg(long, default_value_t = 0)]
    pub inter_threads: usize,

    /// Graph optimisation level for the model session
    #[arg(long, value_enum, default_value_t = OptimizationLevel::All)]
    pub optimization: OptimizationLevel,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: self.optimization,
        }
    }
}
