//! Diesel table definitions for the map schema.
//!
//! These definitions must match `backend/migrations` exactly. Zone and route
//! rows reference `maps.id` with `ON DELETE CASCADE`.

diesel::table! {
    /// Map metadata rows.
    maps (id) {
        /// Primary key, defaulted by `gen_random_uuid()`.
        id -> Uuid,
        name -> Text,
        image_url -> Text,
        created_at -> Timestamptz,
        /// Set on every metadata overwrite.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Zone polygons; `points` is a JSON array of `{x, y}` objects.
    zones (id) {
        id -> Uuid,
        map_id -> Uuid,
        points -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Route paths; `points` is a JSON array of `{x, y}` objects.
    routes (id) {
        id -> Uuid,
        map_id -> Uuid,
        points -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(zones -> maps (map_id));
diesel::joinable!(routes -> maps (map_id));

diesel::allow_tables_to_appear_in_same_query!(maps, zones, routes);
