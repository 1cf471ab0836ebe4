pub mod buy;
pub mod chart;
pub mod history;
pub mod sell;
pub mod serve;
pub mod stocks;
pub mod wallet;
