diesel::table! {
    products (id) {
        id -> Uuid,
        name -> Varchar,
        product_type -> Varchar,
        description -> Nullable<Text>,
        material -> Nullable<Varchar>,
        dimensions -> Nullable<Varchar>,
        colors -> Array<Text>,
        price -> Numeric,
        currency -> Varchar,
        unit -> Varchar,
        price_tiers -> Jsonb,
        availability -> Varchar,
        stock_quantity -> Int4,
        is_featured -> Bool,
        is_archived -> Bool,
        sample_available -> Bool,
        discount_available -> Bool,
        images -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    raw_leather (id) {
        id -> Uuid,
        name -> Varchar,
        leather_type -> Varchar,
        animal -> Varchar,
        finish -> Nullable<Varchar>,
        origin -> Nullable<Varchar>,
        size_sqft -> Nullable<Numeric>,
        thickness_mm -> Nullable<Numeric>,
        colors -> Array<Text>,
        description -> Nullable<Text>,
        price -> Numeric,
        currency -> Varchar,
        unit -> Varchar,
        price_tiers -> Jsonb,
        availability -> Varchar,
        is_featured -> Bool,
        is_archived -> Bool,
        is_active -> Bool,
        negotiable -> Bool,
        images -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    product_types (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    leather_types (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    quote_requests (id) {
        id -> Uuid,
        customer_name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        company -> Nullable<Varchar>,
        product_id -> Nullable<Uuid>,
        product_name -> Varchar,
        product_category -> Nullable<Varchar>,
        quantity -> Int4,
        unit -> Varchar,
        specifications -> Nullable<Text>,
        status -> Varchar,
        admin_notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    sample_requests (id) {
        id -> Uuid,
        customer_name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        company -> Nullable<Varchar>,
        product_id -> Nullable<Uuid>,
        product_name -> Varchar,
        product_category -> Nullable<Varchar>,
        quantity -> Int4,
        address_line -> Varchar,
        city -> Varchar,
        postal_code -> Varchar,
        country -> Varchar,
        shipping_fee -> Numeric,
        currency -> Varchar,
        transfer_id -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    custom_requests (id) {
        id -> Uuid,
        customer_name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        company -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        specifications -> Text,
        quantity -> Int4,
        unit -> Varchar,
        target_price -> Nullable<Numeric>,
        reference_images -> Array<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        subject -> Varchar,
        content -> Text,
        status -> Varchar,
        priority -> Varchar,
        reply_text -> Nullable<Text>,
        replied_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    products,
    raw_leather,
    product_types,
    leather_types,
    quote_requests,
    sample_requests,
    custom_requests,
    messages,
);
