diesel::table! {
    feed_items (id) {
        id -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
        url -> Text,
        published_at -> Nullable<Timestamp>,
        title -> Text,
        content -> Text,
        category -> Text,
    }
}
