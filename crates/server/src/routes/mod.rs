//! HTTP route handlers.
//!
//! Route table:
//!
//! | Method | Path                     | Auth     | Handler                |
//! |--------|--------------------------|----------|------------------------|
//! | POST   | /users/signup            | none     | users::signup          |
//! | POST   | /users/login             | none     | users::login           |
//! | POST   | /users/logout            | any      | users::logout          |
//! | GET    | /users/logged-in-user    | any      | users::logged_in_user  |
//! | POST   | /users                   | admin    | users::create          |
//! | GET    | /users                   | admin    | users::index           |
//! | POST   | /users/byId              | any      | users::by_id           |
//! | PATCH  | /users                   | any      | users::update          |
//! | DELETE | /users                   | any      | users::destroy         |
//! | GET    | /products                | none     | products::index        |
//! | GET    | /products/last4          | none     | products::last_four    |
//! | GET    | /products/paginate       | none     | products::paginate     |
//! | POST   | /products/name           | none     | products::by_name      |
//! | POST   | /products/id             | none     | products::by_id        |
//! | POST   | /products/price          | none     | products::by_price     |
//! | POST   | /products                | admin    | products::create       |
//! | PATCH  | /products                | admin    | products::update       |
//! | DELETE | /products                | admin    | products::destroy      |
//! | POST   | /orders                  | customer | orders::create         |
//! | GET    | /orders                  | admin    | orders::index          |
//! | POST   | /orders/byId             | admin    | orders::by_id          |
//! | PATCH  | /orders                  | admin    | orders::edit           |
//! | DELETE | /orders                  | admin    | orders::destroy        |
//!
//! Mutating endpoints carry the target id in the request body rather than
//! the path.

pub mod orders;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Assemble the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::routes())
        .nest("/products", products::routes())
        .nest("/orders", orders::routes())
}
