//! PostgreSQLアダプターのテスト
//!
//! 実行にはDATABASE_URLが必要:
//! `DATABASE_URL=postgres://... cargo test --test postgres_repository_test -- --ignored`

use chrono::{Duration, Utc};
use rusty_library_lending::adapters::postgres::{
    PostgresBookRepository, PostgresBorrowRepository, PostgresMemberRepository,
    PostgresUnitOfWork,
};
use rusty_library_lending::application::{
    ApplicationError, ServiceDependencies, book_service, borrow_service,
};
use rusty_library_lending::domain::commands::{ReturnBook, UpdateBook};
use rusty_library_lending::domain::{Book, BookBorrowRecord, BookId, BorrowId, MemberId};
use rusty_library_lending::ports::{
    BookBorrowRepository, BookRepository, LendingTransaction as _, UnitOfWork,
};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration as StdDuration;

mod common;

use common::{available_copies, borrow_cmd, cleanup_database, create_test_pool, day_zero};

fn postgres_dependencies(pool: &PgPool) -> ServiceDependencies {
    ServiceDependencies {
        books: Arc::new(PostgresBookRepository::new(pool.clone())),
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        borrows: Arc::new(PostgresBorrowRepository::new(pool.clone())),
        unit_of_work: Arc::new(PostgresUnitOfWork::new(pool.clone())),
    }
}

fn new_book(total_copies: i32) -> Book {
    Book {
        id: BookId::UNASSIGNED,
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        isbn: "123".to_string(),
        published_year: Some(1965),
        genre: None,
        total_copies,
        available_copies: total_copies,
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_book_round_trip_and_delete_in_transaction() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());
    let uow = PostgresUnitOfWork::new(pool.clone());

    let id = books.add(&new_book(3)).await.unwrap();
    assert_eq!(id, BookId::new(1));

    let stored = books.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Dune");
    assert_eq!(stored.published_year, Some(1965));
    assert_eq!(stored.available_copies, 3);

    let mut tx = uow.begin().await.unwrap();
    assert_eq!(tx.count_active_for_book(id).await.unwrap(), 0);
    assert!(tx.delete_book(id).await.unwrap());
    assert!(!tx.delete_book(id).await.unwrap());
    tx.commit().await.unwrap();

    assert!(books.get_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_book_repository_update_and_delete() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());
    let id = books.add(&new_book(3)).await.unwrap();

    // 1冊貸出中にする
    sqlx::query("UPDATE books SET available_copies = 2 WHERE id = $1")
        .bind(id.value())
        .execute(&pool)
        .await
        .unwrap();

    let mut changed = books.get_by_id(id).await.unwrap().unwrap();
    changed.total_copies = 5;
    changed.available_copies = 99;
    changed.updated_at = Some(Utc::now());
    assert!(books.update(&changed).await.unwrap());
    assert_eq!(books.get_by_id(id).await.unwrap().unwrap().available_copies, 4);

    changed.total_copies = 0;
    assert!(!books.update(&changed).await.unwrap());

    assert!(books.delete(id).await.unwrap());
    assert!(!books.delete(id).await.unwrap());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_update_book_keeps_copies_on_loan_against_postgres() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let deps = postgres_dependencies(&pool);
    let book_id = common::seed_book(&deps, "Dune", 3).await;
    let member_id = common::seed_member(&deps, "Ada").await;
    borrow_service::add_borrow(&deps, borrow_cmd(book_id, member_id, day_zero()))
        .await
        .unwrap();

    let update = |id: BookId| UpdateBook {
        id,
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        isbn: "123".to_string(),
        published_year: Some(1965),
        genre: None,
        total_copies: 5,
    };

    book_service::update_book(&deps, update(book_id)).await.unwrap();
    assert_eq!(available_copies(&deps, book_id).await, 4);

    let result = book_service::update_book(&deps, update(BookId::new(999))).await;
    assert!(matches!(
        result,
        Err(ApplicationError::NotFound { entity: "Book", id: 999 })
    ));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_unit_of_work_rolls_back_on_drop() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());
    let uow = PostgresUnitOfWork::new(pool.clone());
    let id = books.add(&new_book(2)).await.unwrap();

    {
        let mut tx = uow.begin().await.unwrap();
        let mut locked = tx.lock_book(id).await.unwrap().unwrap();
        locked.available_copies = 0;
        assert!(tx.update_book(&locked).await.unwrap());
    }

    assert_eq!(books.get_by_id(id).await.unwrap().unwrap().available_copies, 2);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_borrow_insert_requires_existing_member() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());
    let uow = PostgresUnitOfWork::new(pool.clone());
    let book_id = books.add(&new_book(1)).await.unwrap();

    let now = Utc::now();
    let record = BookBorrowRecord {
        id: BorrowId::UNASSIGNED,
        book_id,
        member_id: MemberId::new(77),
        borrow_date: now,
        due_date: now + Duration::days(14),
        return_date: None,
        is_returned: false,
        created_at: now,
        updated_at: None,
    };

    let mut tx = uow.begin().await.unwrap();
    assert!(tx.insert_borrow(&record).await.is_err());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_lending_flow_against_postgres() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let deps = postgres_dependencies(&pool);

    let book_id = common::seed_book(&deps, "Dune", 2).await;
    let member_id = common::seed_member(&deps, "Ada").await;
    assert_eq!(book_id, BookId::new(1));
    assert_eq!(member_id, MemberId::new(1));

    let borrow_id = borrow_service::add_borrow(&deps, borrow_cmd(book_id, member_id, day_zero()))
        .await
        .unwrap();
    assert_eq!(available_copies(&deps, book_id).await, 1);

    let borrows = PostgresBorrowRepository::new(pool.clone());
    let uow = PostgresUnitOfWork::new(pool.clone());
    {
        let mut tx = uow.begin().await.unwrap();
        assert_eq!(tx.count_active_for_book(book_id).await.unwrap(), 1);
        assert_eq!(tx.count_active_for_member(member_id).await.unwrap(), 1);
    }

    let result = book_service::delete_book(&deps, book_id).await;
    assert!(matches!(result, Err(ApplicationError::Conflict(_))));

    borrow_service::return_book(
        &deps,
        ReturnBook {
            borrow_id,
            returned_at: day_zero() + Duration::days(10),
        },
    )
    .await
    .unwrap();

    assert_eq!(available_copies(&deps, book_id).await, 2);
    let mut tx = uow.begin().await.unwrap();
    assert_eq!(tx.count_active_for_book(book_id).await.unwrap(), 0);
    drop(tx);
    let record = borrows.get_by_id(borrow_id).await.unwrap().unwrap();
    assert_eq!(record.return_date, Some(day_zero() + Duration::days(10)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore]
async fn test_row_lock_serializes_concurrent_borrows() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let deps = Arc::new(postgres_dependencies(&pool));

    let book_id = common::seed_book(&deps, "Dune", 1).await;
    let ada = common::seed_member(&deps, "Ada").await;
    let grace = common::seed_member(&deps, "Grace").await;

    let first = {
        let deps = Arc::clone(&deps);
        tokio::spawn(async move {
            borrow_service::add_borrow(&deps, borrow_cmd(book_id, ada, day_zero())).await
        })
    };
    let second = {
        let deps = Arc::clone(&deps);
        tokio::spawn(async move {
            borrow_service::add_borrow(&deps, borrow_cmd(book_id, grace, day_zero())).await
        })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|result| result.is_ok()).count();
    let rejections = results
        .iter()
        .filter(|result| matches!(result, Err(ApplicationError::NoCopiesAvailable(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(rejections, 1);
    assert_eq!(available_copies(&deps, book_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore]
async fn test_member_lock_holds_back_borrows_until_deletion_commits() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let deps = Arc::new(postgres_dependencies(&pool));
    let uow = PostgresUnitOfWork::new(pool.clone());

    let book_id = common::seed_book(&deps, "Dune", 1).await;
    let member_id = common::seed_member(&deps, "Ada").await;

    let mut tx = uow.begin().await.unwrap();
    assert!(tx.lock_member(member_id).await.unwrap().is_some());
    assert_eq!(tx.count_active_for_member(member_id).await.unwrap(), 0);

    let borrow = {
        let deps = Arc::clone(&deps);
        tokio::spawn(async move {
            borrow_service::add_borrow(&deps, borrow_cmd(book_id, member_id, day_zero())).await
        })
    };
    tokio::time::sleep(StdDuration::from_millis(200)).await;
    assert!(!borrow.is_finished());

    assert!(tx.delete_member(member_id).await.unwrap());
    tx.commit().await.unwrap();

    let result = borrow.await.unwrap();
    assert!(matches!(
        result,
        Err(ApplicationError::NotFound {
            entity: "Member",
            ..
        })
    ));
    assert_eq!(available_copies(&deps, book_id).await, 1);
}
