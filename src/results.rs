mod mapper;
mod result_set;
mod row;

pub use mapper::{RowLayout, map_row, map_rows};
pub use result_set::{QueryResult, UpdateResult};
pub use row::RowMapping;
