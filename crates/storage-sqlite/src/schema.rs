diesel::table! {
    campaigns (id) {
        id -> Text,
        user_id -> Text,
        platform -> Text,
        platform_campaign_id -> Text,
        name -> Text,
        status -> Text,
        objective -> Text,
        budget_amount -> Text,
        budget_currency -> Text,
        budget_kind -> Text,
        targeting -> Nullable<Text>,
        start_date -> Nullable<Text>,
        end_date -> Nullable<Text>,

        // Latest metrics snapshot; metrics_date is the presence flag.
        metrics_date -> Nullable<Text>,
        impressions -> BigInt,
        clicks -> BigInt,
        conversions -> Double,
        spend -> Text,
        revenue -> Text,
        metrics_currency -> Nullable<Text>,

        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    platform_connections (id) {
        id -> Text,
        user_id -> Text,
        platform -> Text,
        credentials -> Text,
        account_name -> Nullable<Text>,
        is_active -> Bool,
        sync_status -> Text,
        error_message -> Nullable<Text>,
        last_synced_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    ai_usage (id) {
        id -> Text,
        user_id -> Text,
        feature -> Text,
        cost -> Text,
        created_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(campaigns, platform_connections, ai_usage);
