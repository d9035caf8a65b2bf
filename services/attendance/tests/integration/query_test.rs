use rollcall_attendance::AttendanceDb;
use rollcall_attendance::StoreError;
use rollcall_attendance::domain::{Student, StudentField};
use rollcall_domain::ValidationError;
use rollcall_domain::filter::Filter;
use rollcall_domain::id::StudentId;
use rollcall_domain::order::OrderBy;
use rollcall_domain::query::FindMany;

use crate::helpers::{day, db, new_student};

async fn seed(db: &AttendanceDb, rows: &[(&str, &str, Option<&str>)]) -> Vec<Student> {
    let mut out = Vec::new();
    for (first, last, email) in rows {
        let mut input = new_student(first, last);
        input.email = email.map(str::to_owned);
        out.push(db.students().create(input).await.unwrap());
    }
    out
}

fn last_names(rows: &[Student]) -> Vec<&str> {
    rows.iter().map(|s| s.last_name.as_str()).collect()
}

fn first_names(rows: &[Student]) -> Vec<&str> {
    rows.iter().map(|s| s.first_name.as_str()).collect()
}

async fn alphabet(db: &AttendanceDb) -> Vec<Student> {
    seed(
        db,
        &[
            ("Cy", "C", None),
            ("Ann", "A", None),
            ("Eve", "E", None),
            ("Bo", "B", None),
            ("Di", "D", None),
        ],
    )
    .await
}

fn by_last_name() -> FindMany<StudentField> {
    FindMany::new().order_by(OrderBy::asc(StudentField::LastName))
}

// ── filters ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_match_text_case_insensitively_only_when_asked() {
    let db = db().await;
    seed(&db, &[("Ann", "Lee", None), ("Joanne", "Kim", None), ("Bo", "Hall", None)]).await;

    let insensitive = db
        .students()
        .find_many(
            by_last_name().filter(Filter::contains(StudentField::FirstName, "ANN").insensitive()),
        )
        .await
        .unwrap();
    assert_eq!(first_names(&insensitive), ["Joanne", "Ann"]);

    let sensitive = db
        .students()
        .find_many(by_last_name().filter(Filter::contains(StudentField::FirstName, "ann")))
        .await
        .unwrap();
    assert_eq!(first_names(&sensitive), ["Joanne"]);
}

#[tokio::test]
async fn should_treat_pattern_characters_literally() {
    let db = db().await;
    seed(&db, &[("A_x", "One", None), ("Abx", "Two", None), ("A*x", "Three", None)]).await;

    let underscore = db
        .students()
        .find_many(FindMany::new().filter(Filter::starts_with(StudentField::FirstName, "A_")))
        .await
        .unwrap();
    assert_eq!(first_names(&underscore), ["A_x"]);

    let star = db
        .students()
        .find_many(FindMany::new().filter(Filter::ends_with(StudentField::FirstName, "*x")))
        .await
        .unwrap();
    assert_eq!(first_names(&star), ["A*x"]);
}

#[tokio::test]
async fn should_combine_in_not_and_or() {
    let db = db().await;
    alphabet(&db).await;

    let rows = db
        .students()
        .find_many(
            by_last_name().filter(
                Filter::is_in(StudentField::LastName, ["A", "B", "C", "D"])
                    .and(Filter::any([
                        Filter::eq(StudentField::FirstName, "Ann"),
                        Filter::eq(StudentField::FirstName, "Bo"),
                    ])
                    .negate()),
            ),
        )
        .await
        .unwrap();
    assert_eq!(last_names(&rows), ["C", "D"]);

    let rows = db
        .students()
        .find_many(by_last_name().filter(Filter::not_in(StudentField::LastName, ["A", "E"])))
        .await
        .unwrap();
    assert_eq!(last_names(&rows), ["B", "C", "D"]);
}

#[tokio::test]
async fn should_compare_null_aware() {
    let db = db().await;
    seed(
        &db,
        &[
            ("Ann", "A", Some("a@school.edu")),
            ("Bo", "B", None),
            ("Cy", "C", Some("c@school.edu")),
        ],
    )
    .await;

    let without = db
        .students()
        .find_many(by_last_name().filter(Filter::is_null(StudentField::Email)))
        .await
        .unwrap();
    assert_eq!(last_names(&without), ["B"]);

    // Rows with a null email never equal, and never differ from, a value.
    let not_a = db
        .students()
        .find_many(by_last_name().filter(Filter::ne(StudentField::Email, "a@school.edu")))
        .await
        .unwrap();
    assert_eq!(last_names(&not_a), ["C"]);
}

#[tokio::test]
async fn should_filter_date_ranges() {
    let db = db().await;
    for (name, born) in [("A", day(2010, 1, 1)), ("B", day(2012, 6, 1)), ("C", day(2014, 1, 1))] {
        let mut input = new_student("Kid", name);
        input.date_of_birth = born;
        db.students().create(input).await.unwrap();
    }

    let rows = db
        .students()
        .find_many(by_last_name().filter(Filter::all([
            Filter::gte(StudentField::DateOfBirth, day(2011, 1, 1)),
            Filter::lt(StudentField::DateOfBirth, day(2014, 1, 1)),
        ])))
        .await
        .unwrap();
    assert_eq!(last_names(&rows), ["B"]);
}

#[tokio::test]
async fn should_reject_invalid_filter_before_querying() {
    let db = db().await;
    let err = db
        .students()
        .find_many(FindMany::new().filter(Filter::contains(StudentField::DateOfBirth, "2012")))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            StoreError::Validation(ValidationError::UnsupportedOperator { .. })
        ),
        "got {err:?}"
    );
    assert_eq!(err.kind(), "VALIDATION");
}

#[tokio::test]
async fn should_count_matching_rows() {
    let db = db().await;
    alphabet(&db).await;
    let n = db
        .students()
        .count(Some(Filter::gt(StudentField::LastName, "B")))
        .await
        .unwrap();
    assert_eq!(n, 3);
}

// ── ordering ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_place_nulls_per_key() {
    let db = db().await;
    seed(
        &db,
        &[
            ("Ann", "A", Some("a@school.edu")),
            ("Bo", "B", None),
            ("Cy", "C", Some("c@school.edu")),
        ],
    )
    .await;
    let order = |key: OrderBy<StudentField>| FindMany::new().order_by(key);

    let asc = db
        .students()
        .find_many(order(OrderBy::asc(StudentField::Email)))
        .await
        .unwrap();
    assert_eq!(last_names(&asc), ["A", "C", "B"]);

    let desc = db
        .students()
        .find_many(order(OrderBy::desc(StudentField::Email)))
        .await
        .unwrap();
    assert_eq!(last_names(&desc), ["B", "C", "A"]);

    let asc_nulls_first = db
        .students()
        .find_many(order(OrderBy::asc(StudentField::Email).nulls_first()))
        .await
        .unwrap();
    assert_eq!(last_names(&asc_nulls_first), ["B", "A", "C"]);
}

#[tokio::test]
async fn should_break_ties_by_id() {
    let db = db().await;
    let rows = seed(&db, &[("Ann", "Lee", None), ("Bo", "Lee", None), ("Cy", "Lee", None)]).await;
    let mut ids: Vec<StudentId> = rows.iter().map(|s| s.id).collect();
    ids.sort();

    let found = db.students().find_many(by_last_name()).await.unwrap();
    let found_ids: Vec<StudentId> = found.iter().map(|s| s.id).collect();
    assert_eq!(found_ids, ids);
}

#[tokio::test]
async fn should_return_first_row_of_ordering() {
    let db = db().await;
    alphabet(&db).await;

    let last = db
        .students()
        .find_first(FindMany::new().order_by(OrderBy::desc(StudentField::LastName)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.last_name, "E");

    let err = db
        .students()
        .find_first_or_throw(FindMany::new().filter(Filter::eq(StudentField::LastName, "Z")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

// ── pagination ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_page_with_skip_and_take() {
    let db = db().await;
    alphabet(&db).await;
    let page = db
        .students()
        .find_many(by_last_name().skip(1).take(2))
        .await
        .unwrap();
    assert_eq!(last_names(&page), ["B", "C"]);
}

#[tokio::test]
async fn should_skip_without_take() {
    let db = db().await;
    alphabet(&db).await;
    let rest = db
        .students()
        .find_many(by_last_name().skip(3))
        .await
        .unwrap();
    assert_eq!(last_names(&rest), ["D", "E"]);
}

#[tokio::test]
async fn should_page_forward_and_backward_from_cursor() {
    let db = db().await;
    let rows = alphabet(&db).await;
    let c = rows.iter().find(|s| s.last_name == "C").unwrap().id;

    let forward = db
        .students()
        .find_many(by_last_name().cursor(c).take(2))
        .await
        .unwrap();
    assert_eq!(last_names(&forward), ["D", "E"]);

    let backward = db
        .students()
        .find_many(by_last_name().cursor(c).take(-2))
        .await
        .unwrap();
    assert_eq!(last_names(&backward), ["A", "B"]);

    let skipped = db
        .students()
        .find_many(by_last_name().cursor(c).skip(1).take(5))
        .await
        .unwrap();
    assert_eq!(last_names(&skipped), ["E"]);
}

#[tokio::test]
async fn should_take_tail_with_negative_take() {
    let db = db().await;
    alphabet(&db).await;
    let tail = db
        .students()
        .find_many(by_last_name().take(-2))
        .await
        .unwrap();
    assert_eq!(last_names(&tail), ["D", "E"]);
}

#[tokio::test]
async fn should_return_empty_page_for_missing_cursor() {
    let db = db().await;
    alphabet(&db).await;
    let page = db
        .students()
        .find_many(by_last_name().cursor(StudentId::new()).take(2))
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn should_walk_past_null_keys_with_cursor() {
    let db = db().await;
    let rows = seed(
        &db,
        &[
            ("Ann", "A", Some("a@school.edu")),
            ("Bo", "B", None),
            ("Cy", "C", Some("c@school.edu")),
            ("Di", "D", None),
        ],
    )
    .await;
    let c = rows[2].id;
    let order = FindMany::new().order_by(OrderBy::asc(StudentField::Email));

    let all = db.students().find_many(order.clone()).await.unwrap();
    let after_c = db
        .students()
        .find_many(order.clone().cursor(c).take(10))
        .await
        .unwrap();
    let expected: Vec<_> = all.iter().skip(2).map(|s| s.id).collect();
    assert_eq!(after_c.iter().map(|s| s.id).collect::<Vec<_>>(), expected);

    let before_first_null = db
        .students()
        .find_many(order.cursor(all[2].id).take(-10))
        .await
        .unwrap();
    assert_eq!(last_names(&before_first_null), ["A", "C"]);
}
