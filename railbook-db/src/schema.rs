table! {
    crews (id) {
        id -> Int4,
        first_name -> Varchar,
        last_name -> Varchar,
    }
}

table! {
    train_types (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    trains (id) {
        id -> Int4,
        name -> Varchar,
        cargo_num -> Int4,
        places_in_cargo -> Int4,
        train_type_id -> Int4,
    }
}

table! {
    stations (id) {
        id -> Int4,
        name -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
    }
}

table! {
    routes (id) {
        id -> Int4,
        source_id -> Nullable<Int4>,
        destination_id -> Nullable<Int4>,
        distance -> Int4,
    }
}

table! {
    journeys (id) {
        id -> Int4,
        route_id -> Int4,
        train_id -> Nullable<Int4>,
        departure_time -> Timestamp,
        arrival_time -> Timestamp,
    }
}

table! {
    journeys_crews (id) {
        id -> Int4,
        journey_id -> Int4,
        crew_id -> Int4,
    }
}

table! {
    orders (id) {
        id -> Int4,
        created_at -> Timestamp,
        user_id -> Varchar,
    }
}

table! {
    tickets (id) {
        id -> Int4,
        cargo -> Int4,
        seat -> Int4,
        journey_id -> Int4,
        order_id -> Int4,
    }
}

joinable!(trains -> train_types (train_type_id));
joinable!(journeys -> routes (route_id));
joinable!(journeys -> trains (train_id));
joinable!(journeys_crews -> journeys (journey_id));
joinable!(journeys_crews -> crews (crew_id));
joinable!(tickets -> journeys (journey_id));
joinable!(tickets -> orders (order_id));

allow_tables_to_appear_in_same_query!(
    crews,
    train_types,
    trains,
    stations,
    routes,
    journeys,
    journeys_crews,
    orders,
    tickets,
);
