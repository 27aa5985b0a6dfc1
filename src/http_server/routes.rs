//! Route table
//!
//! Every endpoint the server mounts, listed at boot and by `bookshelf routes`.

/// One mounted endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

const fn endpoint(method: &'static str, path: &'static str, summary: &'static str) -> Endpoint {
    Endpoint {
        method,
        path,
        summary,
    }
}

pub const ENDPOINTS: &[Endpoint] = &[
    endpoint("GET", "/books", "list books, ?category= filters"),
    endpoint("POST", "/books", "create a book"),
    endpoint("GET", "/books/:id", "fetch a book"),
    endpoint("PUT", "/books/:id", "update a book"),
    endpoint("DELETE", "/books/:id", "delete a book"),
    endpoint("GET", "/users", "list users"),
    endpoint("POST", "/users", "create a user"),
    endpoint("GET", "/users/:id", "fetch a user"),
    endpoint("PUT", "/users/:id", "update a user"),
    endpoint("DELETE", "/users/:id", "delete a user"),
    endpoint("PATCH", "/users/:id/avatar", "attach an avatar image"),
    endpoint("GET", "/files/booksJSON", "gzipped JSON export"),
    endpoint("GET", "/files/CSV", "CSV export"),
    endpoint("GET", "/files/PDF", "PDF export"),
    endpoint("POST", "/files/single", "upload one avatar"),
    endpoint("POST", "/files/multiple", "upload several avatars"),
    endpoint("POST", "/files/cloudinary", "upload to the image host"),
];

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<7} {:<22} {}", self.method, self.path, self.summary)
    }
}
