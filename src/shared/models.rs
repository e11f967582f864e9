pub mod schema {
    diesel::table! {
        profiles (id) {
            id -> Uuid,
            email -> Text,
            display_name -> Text,
            password_hash -> Text,
            role -> Text,
            super_role -> Nullable<Text>,
            is_active -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        clients (id) {
            id -> Uuid,
            name -> Text,
            industry -> Nullable<Text>,
            website -> Nullable<Text>,
            phone -> Nullable<Text>,
            status -> Text,
            created_by -> Uuid,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        client_users (id) {
            id -> Uuid,
            client_id -> Uuid,
            user_id -> Uuid,
            member_role -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        client_customers (id) {
            id -> Uuid,
            client_id -> Uuid,
            name -> Text,
            email -> Nullable<Text>,
            phone -> Nullable<Text>,
            company -> Nullable<Text>,
            scoring_status -> Text,
            score -> Nullable<Int4>,
            score_summary -> Nullable<Text>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        client_leads (id) {
            id -> Uuid,
            client_id -> Uuid,
            name -> Text,
            email -> Text,
            phone -> Nullable<Text>,
            company -> Nullable<Text>,
            status -> Text,
            source -> Text,
            assigned_to -> Nullable<Uuid>,
            created_by -> Uuid,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        lead_todos (id) {
            id -> Uuid,
            lead_id -> Uuid,
            title -> Text,
            description -> Nullable<Text>,
            status -> Text,
            due_date -> Nullable<Timestamptz>,
            position -> Int4,
            created_by -> Uuid,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        lead_todo_notes (id) {
            id -> Uuid,
            todo_id -> Uuid,
            author_id -> Uuid,
            body -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        lead_chatter (id) {
            id -> Uuid,
            lead_id -> Uuid,
            author_id -> Uuid,
            body -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        lead_files (id) {
            id -> Uuid,
            lead_id -> Uuid,
            file_name -> Text,
            file_path -> Text,
            file_size -> Int8,
            mime_type -> Nullable<Text>,
            uploaded_by -> Uuid,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        client_notes (id) {
            id -> Uuid,
            client_id -> Uuid,
            author_id -> Uuid,
            title -> Nullable<Text>,
            body -> Text,
            pinned -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        client_meetings (id) {
            id -> Uuid,
            client_id -> Uuid,
            title -> Text,
            agenda -> Nullable<Text>,
            scheduled_at -> Timestamptz,
            duration_minutes -> Int4,
            location -> Nullable<Text>,
            created_by -> Uuid,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        templates (id) {
            id -> Uuid,
            name -> Text,
            kind -> Text,
            subject -> Nullable<Text>,
            body -> Nullable<Text>,
            items -> Jsonb,
            is_active -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        app_settings (id) {
            id -> Uuid,
            key -> Text,
            value -> Text,
            updated_at -> Timestamptz,
        }
    }
}

pub use schema::*;
