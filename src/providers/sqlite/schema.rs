diesel::table! {
    local_storage (key) {
        key -> Text,
        value -> Text,
        updated_at -> BigInt,
    }
}
