pub mod columns;
pub mod demo;
pub mod directory;
pub mod export;
pub mod feves;
pub mod gviz;
pub mod heroes;
pub mod http_client;
pub mod passives;
pub mod players;
pub mod provider;
pub mod relay;
pub mod revalidate;
pub mod sheets;
pub mod state;
pub mod techniques;
pub mod text;
pub mod thresholds;
pub mod tokens;
