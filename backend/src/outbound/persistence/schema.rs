//! Diesel table definitions for the CommunityFix PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts. `email` is unique.
    users (id) {
        id -> Uuid,
        full_name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// `ADMIN`, `MUNICIPALITY` or `USER`.
        role -> Varchar,
        verified -> Bool,
        municipality -> Nullable<Varchar>,
        ward -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        profile_picture -> Nullable<Text>,
        citizenship_document -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Civic issue reports.
    reports (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        municipality -> Varchar,
        ward -> Varchar,
        photos -> Array<Text>,
        /// Denormalised count of rows in `upvotes` targeting this report.
        upvote_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Improvement suggestions.
    suggestions (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        municipality -> Varchar,
        ward -> Varchar,
        status -> Varchar,
        upvote_count -> Int4,
        comment_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on reports or suggestions.
    comments (id) {
        id -> Uuid,
        author_id -> Uuid,
        /// `report` or `suggestion`.
        target_kind -> Varchar,
        target_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per user and upvoted item.
    upvotes (user_id, target_kind, target_id) {
        user_id -> Uuid,
        target_kind -> Varchar,
        target_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        kind -> Varchar,
        message -> Text,
        actor_id -> Nullable<Uuid>,
        target_kind -> Nullable<Varchar>,
        target_id -> Nullable<Uuid>,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(reports -> users (author_id));
diesel::joinable!(suggestions -> users (author_id));
diesel::joinable!(comments -> users (author_id));
diesel::joinable!(upvotes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    reports,
    suggestions,
    comments,
    upvotes,
    notifications,
);
