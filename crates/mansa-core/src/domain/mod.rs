//! 주식 데이터 조회를 위한 도메인 모델.

mod access;
mod catalog;
mod query;
mod range;
mod response;
mod row;

pub use access::*;
pub use catalog::*;
pub use query::*;
pub use range::*;
pub use response::*;
pub use row::*;
