use super::{FieldCheck, FieldSpec, FieldType, Shape};

use FieldType::{Bool, Int, IntList, Nested, NestedList, Object, Str, StrList, StrOrNumber};

pub static OUT_OF_OFFICE_SETTINGS: Shape = Shape {
    label: "campaign update body.out_of_office_detection_settings",
    fields: &[
        FieldSpec::optional("ignoreOOOasReply", Bool),
        FieldSpec::optional("autoReactivateOOO", Bool),
        FieldSpec::optional("reactivateOOOwithDelay", Str),
        FieldSpec::optional("autoCategorizeOOO", Bool),
    ],
    require_any: false,
};

pub static CAMPAIGN_CREATE: Shape = Shape {
    label: "campaign create body",
    fields: &[
        FieldSpec::required("name", Str),
        FieldSpec::optional("client_id", Int),
    ],
    require_any: false,
};

pub static CAMPAIGN_UPDATE: Shape = Shape {
    label: "campaign update body",
    fields: &[
        FieldSpec::optional("track_settings", StrList),
        FieldSpec::optional("stop_lead_settings", Str),
        FieldSpec::optional("unsubscribe_text", Str),
        FieldSpec::optional("send_as_plain_text", Bool),
        FieldSpec::optional("follow_up_percentage", Int).between(0, 100),
        FieldSpec::optional("client_id", Int),
        FieldSpec::optional("enable_ai_esp_matching", Bool),
        FieldSpec::optional("name", Str),
        FieldSpec::optional("force_plain_text", Bool),
        FieldSpec::optional("auto_pause_domain_leads_on_reply", Bool),
        FieldSpec::optional("ignore_ss_mailbox_sending_limit", Bool),
        FieldSpec::optional("bounce_autopause_threshold", Str),
        FieldSpec::optional(
            "out_of_office_detection_settings",
            Nested(&OUT_OF_OFFICE_SETTINGS),
        ),
        FieldSpec::optional("ai_categorisation_options", IntList),
        FieldSpec::optional("domain_level_rate_limit", Bool),
        FieldSpec::optional("add_unsubscribe_tag", Bool),
    ],
    require_any: true,
};

pub static CAMPAIGN_SCHEDULE: Shape = Shape {
    label: "campaign schedule body",
    fields: &[
        FieldSpec::optional("timezone", Str),
        FieldSpec::optional("days_of_the_week", IntList)
            .check(FieldCheck::ElementsInRange { min: 0, max: 6 }),
        FieldSpec::optional("start_hour", Str),
        FieldSpec::optional("end_hour", Str),
        FieldSpec::optional("min_time_btw_emails", Int).at_least(0),
        FieldSpec::optional("max_new_leads_per_day", Int).at_least(0),
        FieldSpec::optional("schedule_start_time", Str),
    ],
    require_any: true,
};

pub static LEAD_INPUT: Shape = Shape {
    label: "lead input",
    fields: &[
        FieldSpec::optional("first_name", Str),
        FieldSpec::optional("last_name", Str),
        FieldSpec::optional("email", Str),
        FieldSpec::optional("phone_number", StrOrNumber),
        FieldSpec::optional("company_name", Str),
        FieldSpec::optional("website", Str),
        FieldSpec::optional("location", Str),
        FieldSpec::optional("custom_fields", Object),
        FieldSpec::optional("linkedin_profile", Str),
        FieldSpec::optional("company_url", Str),
    ],
    require_any: false,
};

pub static CAMPAIGN_LEADS_ADD_SETTINGS: Shape = Shape {
    label: "campaign leads add body.settings",
    fields: &[
        FieldSpec::optional("ignore_global_block_list", Bool),
        FieldSpec::optional("ignore_unsubscribe_list", Bool),
        FieldSpec::optional("ignore_community_bounce_list", Bool),
        FieldSpec::optional("ignore_duplicate_leads_in_other_campaign", Bool),
        FieldSpec::optional("ignore_duplicate_leads_in_same_campaign", Bool),
        FieldSpec::optional("ignore_invalid_emails", Bool),
    ],
    require_any: false,
};

pub static CAMPAIGN_LEADS_ADD: Shape = Shape {
    label: "campaign leads add body",
    fields: &[
        FieldSpec::required("lead_list", NestedList(&LEAD_INPUT))
            .check(FieldCheck::ElementsHaveEmail),
        FieldSpec::optional("settings", Nested(&CAMPAIGN_LEADS_ADD_SETTINGS)),
    ],
    require_any: false,
};

pub static CAMPAIGN_LEAD_UPDATE: Shape = Shape {
    label: "campaign lead update body",
    fields: &[
        FieldSpec::optional("first_name", Str),
        FieldSpec::optional("last_name", Str),
        FieldSpec::required("email", Str),
        FieldSpec::optional("phone_number", StrOrNumber),
        FieldSpec::optional("company_name", Str),
        FieldSpec::optional("website", Str),
        FieldSpec::optional("location", Str),
        FieldSpec::optional("custom_fields", Object),
        FieldSpec::optional("linkedin_profile", Str),
        FieldSpec::optional("company_url", Str),
    ],
    require_any: true,
};

pub static CAMPAIGN_WEBHOOK_UPSERT: Shape = Shape {
    label: "campaign webhook upsert body",
    fields: &[
        FieldSpec::optional("id", Int),
        FieldSpec::required("name", Str),
        FieldSpec::required("webhook_url", Str),
        FieldSpec::required("event_types", StrList).check(FieldCheck::NonEmpty),
        FieldSpec::optional("categories", StrList),
    ],
    require_any: false,
};
