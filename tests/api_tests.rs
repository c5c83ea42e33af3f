//! API integration tests.
//!
//! These run against a live server with a migrated database and a seeded
//! admin account (admin@librarium.org / admin). Run with:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5000/api/v1";

fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}+{}@example.com", prefix, nanos)
}

async fn register_and_login(client: &Client, prefix: &str) -> (String, Value) {
    let email = unique_email(prefix);

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "full_name": "Test Student",
            "email": email,
            "password": "Passw0rd"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "Passw0rd" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    (token, body["user"].clone())
}

async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@librarium.org",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send admin login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_book(client: &Client, admin_token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "isbn": "978-0-00-000000-0",
            "category": "Fiction"
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    assert_eq!(body["available"], true);
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_login_and_me() {
    let client = Client::new();
    let (token, user) = register_and_login(&client, "alice").await;

    assert_eq!(user["role"], "student");
    assert_eq!(user["full_name"], "Test Student");

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["email"], user["email"]);
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_conflicts() {
    let client = Client::new();
    let email = unique_email("dup");

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/auth/register", BASE_URL))
            .json(&json!({
                "full_name": "Dup User",
                "email": email,
                "password": "Passw0rd"
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_bad_input() {
    let client = Client::new();

    // Malformed email
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "full_name": "Bad Email",
            "email": "not-an-email",
            "password": "Passw0rd"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Short password
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "full_name": "Short Password",
            "email": unique_email("shortpw"),
            "password": "abc"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_search_books_by_category_substring() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token, "Category Search Marker").await;

    // Case-insensitive substring on category
    let response = client
        .get(format!("{}/books?category=fic", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(books.iter().all(|b| b["category"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("fic")));
    assert!(books.iter().any(|b| b["id"].as_i64() == Some(book_id)));

    // No filters returns everything, including the new book
    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(books.iter().any(|b| b["id"].as_i64() == Some(book_id)));
}

#[tokio::test]
#[ignore]
async fn test_non_admin_cannot_mutate_catalog() {
    let client = Client::new();
    let (token, _) = register_and_login(&client, "student").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden Book",
            "author": "Nobody",
            "isbn": "0",
            "category": "None"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_lifecycle() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_and_login(&client, "borrower").await;
    let book_id = create_book(&client, &admin_token, "Lifecycle Book").await;

    // Borrow
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    assert_eq!(loan["returned"], false);

    // Due date is borrow date + 14 days
    let borrowed: chrono::DateTime<chrono::Utc> =
        loan["borrowed_date"].as_str().unwrap().parse().unwrap();
    let due: chrono::DateTime<chrono::Utc> =
        loan["due_date"].as_str().unwrap().parse().unwrap();
    assert_eq!(due - borrowed, chrono::Duration::days(14));

    // The book is now unavailable
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available"], false);

    // A second borrow of the same pair fails without creating a loan
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // The loan shows up in the caller's list
    let loans: Vec<Value> = client
        .get(format!("{}/loans/my", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(loans.iter().any(|l| l["id"].as_i64() == Some(loan_id)));
    assert!(loans
        .iter()
        .find(|l| l["id"].as_i64() == Some(loan_id))
        .map(|l| l["title"] == "Lifecycle Book")
        .unwrap_or(false));

    // Return
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    // The book is available again
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available"], true);

    // Returning the same loan again is NotFound, not a double credit,
    // and the body names the loan rather than the book
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoSuchLoan");
}

#[tokio::test]
#[ignore]
async fn test_borrow_unavailable_book_fails() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (first, _) = register_and_login(&client, "first").await;
    let (second, _) = register_and_login(&client, "second").await;
    let book_id = create_book(&client, &admin_token, "Contended Book").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", first))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // A different user cannot borrow the single-flag book while it is out
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", second))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_renew_extends_due_date() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_and_login(&client, "renewer").await;
    let book_id = create_book(&client, &admin_token, "Renewable Book").await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();
    let due_before: chrono::DateTime<chrono::Utc> =
        loan["due_date"].as_str().unwrap().parse().unwrap();

    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send renew request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    let due_after: chrono::DateTime<chrono::Utc> =
        body["loan"]["due_date"].as_str().unwrap().parse().unwrap();
    assert!(due_after > due_before);
    assert_eq!(body["loan"]["renewals"], 1);
}

#[tokio::test]
#[ignore]
async fn test_fresh_loan_is_not_due_soon() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_and_login(&client, "duesoon").await;
    let book_id = create_book(&client, &admin_token, "Freshly Borrowed Book").await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    // The fresh loan is due a full loan period out, well past the
    // seven-day window, so the due-soon listing must not include it
    let due_soon: Vec<Value> = client
        .get(format!("{}/loans/due-soon", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(due_soon.iter().all(|l| l["id"].as_i64() != Some(loan_id)));

    // It still shows up in the caller's full listing
    let loans: Vec<Value> = client
        .get(format!("{}/loans/my", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(loans.iter().any(|l| l["id"].as_i64() == Some(loan_id)));
}

#[tokio::test]
#[ignore]
async fn test_renew_someone_elses_loan_fails() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (owner, _) = register_and_login(&client, "owner").await;
    let (intruder, _) = register_and_login(&client, "intruder").await;
    let book_id = create_book(&client, &admin_token, "Private Loan").await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", intruder))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_admin_sees_all_loans_with_borrower_fields() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, user) = register_and_login(&client, "visible").await;
    let book_id = create_book(&client, &admin_token, "Visible Loan").await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    let loans: Vec<Value> = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let entry = loans
        .iter()
        .find(|l| l["id"].as_i64() == Some(loan_id))
        .expect("Loan missing from admin listing");
    assert_eq!(entry["borrower_email"], user["email"]);
    assert_eq!(entry["title"], "Visible Loan");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_borrow_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
