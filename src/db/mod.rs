pub mod position_queries;
