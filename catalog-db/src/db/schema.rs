diesel::table! {
    cve_data (cve_id) {
        cve_id -> Text,
        published_date -> Timestamptz,
        last_modified_date -> Timestamptz,
        vulnerability_status -> Text,
        description -> Text,
        cvss_v3_vector -> Nullable<Text>,
        cvss_v3_base_score -> Nullable<Float8>,
        cvss_v3_base_severity -> Nullable<Text>,
        cvss_v4_vector -> Nullable<Text>,
        cvss_v4_base_score -> Nullable<Float8>,
        cvss_v4_base_severity -> Nullable<Text>,
        affected_products -> Array<Text>,
        reference_links -> Array<Text>,
        cwe_ids -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    analysis_data (cve_id) {
        cve_id -> Text,
        analysis_summary -> Nullable<Text>,
        recommendation -> Nullable<Text>,
        risk_level -> Nullable<Int4>,
        vulnerability_type -> Nullable<Text>,
        affected_systems -> Nullable<Text>,
        affected_products -> Nullable<Array<Text>>,
        technical_details -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(analysis_data -> cve_data (cve_id));

diesel::allow_tables_to_appear_in_same_query!(cve_data, analysis_data);
