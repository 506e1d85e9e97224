use crate::ports::{BookBorrowRepository, BookRepository, MemberRepository, UnitOfWork};
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、各サービス関数に明示的に渡される。
/// 具体的なアダプター（PostgreSQL / インメモリ）の選択は合成時に行う。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub books: Arc<dyn BookRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub borrows: Arc<dyn BookBorrowRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
}
