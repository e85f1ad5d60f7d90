diesel::table! {
    users (id) {
        id -> Uuid,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        email_verified -> Bool,
        is_active -> Bool,
        otp -> Nullable<Text>,
        otp_expires -> Nullable<Timestamptz>,
        invite_token -> Nullable<Text>,
        invite_expires -> Nullable<Timestamptz>,
        password_reset_token -> Nullable<Text>,
        password_reset_expires -> Nullable<Timestamptz>,
        assigned_department -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tickets (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        status -> Text,
        priority -> Text,
        category -> Text,
        department -> Nullable<Text>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ticket_comments (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        author_id -> Uuid,
        body -> Text,
        is_internal -> Bool,
        parent_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tickets -> users (created_by));
diesel::joinable!(ticket_comments -> tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(users, tickets, ticket_comments);
