//! Request and response types of the workflow service.

use chrono::DateTime;
use chrono::Utc;
use wirebind::Binding;
use wirebind::ElementKind;
use wirebind::Location;
use wirepack::Document;

use crate::unmarshall;
use crate::unmarshall::Unmarshall;

wirebind::wire_enum! {
    /// Whether a domain accepts new work.
    pub enum RegistrationStatus as "RegistrationStatus" {
        Registered => "REGISTERED",
        Deprecated => "DEPRECATED",
    }
}

wirebind::wire_enum! {
    /// How a domain spreads its history across storage partitions.
    pub enum Distribution as "Distribution" {
        Random => "Random",
        ByLogStream => "ByLogStream",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTag {
    pub key: Option<String>,
    pub value: Option<String>,
}

wirebind::structured!(ResourceTag as "ResourceTag" {
    key => Binding::scalar("key", Location::PayloadField),
    value => Binding::scalar("value", Location::PayloadField),
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    pub name: Option<String>,
}

wirebind::structured!(TaskList as "TaskList" {
    name => Binding::scalar("name", Location::PayloadField),
});

// ============================================================================
//  REQUESTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterDomainInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub retention_period_days: Option<i32>,
    pub history_distribution: Option<Distribution>,
    pub tags: Option<Vec<ResourceTag>>,
    /// Idempotency token; repeated registrations with the same token are no-ops.
    pub client_token: Option<String>,
}

wirebind::structured!(RegisterDomainInput as "RegisterDomainInput" {
    name => Binding::scalar("name", Location::PayloadField),
    description => Binding::scalar("description", Location::PayloadField),
    retention_period_days => Binding::scalar("workflowExecutionRetentionPeriodInDays", Location::PayloadField),
    history_distribution => Binding::scalar("historyDistribution", Location::PayloadField),
    tags => Binding::list("tags", Location::PayloadField, ElementKind::Structured),
    client_token => Binding::scalar("X-Client-Token", Location::Header),
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeprecateDomainInput {
    pub name: Option<String>,
}

wirebind::structured!(DeprecateDomainInput as "DeprecateDomainInput" {
    name => Binding::scalar("name", Location::Path),
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescribeDomainInput {
    pub name: Option<String>,
}

wirebind::structured!(DescribeDomainInput as "DescribeDomainInput" {
    name => Binding::scalar("name", Location::Path),
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDomainsInput {
    pub registration_status: Option<RegistrationStatus>,
    pub maximum_page_size: Option<i32>,
    pub next_page_token: Option<String>,
    pub reverse_order: Option<bool>,
}

wirebind::structured!(ListDomainsInput as "ListDomainsInput" {
    registration_status => Binding::scalar("registrationStatus", Location::Query),
    maximum_page_size => Binding::scalar("maximumPageSize", Location::Query),
    next_page_token => Binding::scalar("nextPageToken", Location::Query),
    reverse_order => Binding::scalar("reverseOrder", Location::Query),
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountPendingActivityTasksInput {
    pub domain: Option<String>,
    pub task_list: Option<TaskList>,
}

wirebind::structured!(CountPendingActivityTasksInput as "CountPendingActivityTasksInput" {
    domain => Binding::scalar("domain", Location::Path),
    task_list => Binding::structured("taskList"),
});

// ============================================================================
//  RESPONSES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DomainInfo {
    pub name: String,
    pub status: RegistrationStatus,
    pub description: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl Unmarshall for DomainInfo {
    fn unmarshall(document: &Document) -> unmarshall::Result<Self> {
        Ok(Self {
            name: unmarshall::required(unmarshall::string(document, "name")?, "name")?,
            status: unmarshall::required(unmarshall::enumeration(document, "status")?, "status")?,
            description: unmarshall::string(document, "description")?,
            registered_at: unmarshall::timestamp(document, "registeredAt")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainDetail {
    pub info: DomainInfo,
    pub retention_period_days: Option<i64>,
    pub history_distribution: Option<Distribution>,
}

impl Unmarshall for DomainDetail {
    fn unmarshall(document: &Document) -> unmarshall::Result<Self> {
        Ok(Self {
            info: unmarshall::required(unmarshall::structure(document, "domainInfo")?, "domainInfo")?,
            retention_period_days: unmarshall::integer(document, "workflowExecutionRetentionPeriodInDays")?,
            history_distribution: unmarshall::enumeration(document, "historyDistribution")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainInfos {
    pub domain_infos: Vec<DomainInfo>,
    pub next_page_token: Option<String>,
}

impl Unmarshall for DomainInfos {
    fn unmarshall(document: &Document) -> unmarshall::Result<Self> {
        Ok(Self {
            domain_infos: unmarshall::list(document, "domainInfos")?.unwrap_or_default(),
            next_page_token: unmarshall::string(document, "nextPageToken")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingTaskCount {
    pub count: i64,
    /// The service stopped counting before reaching the end.
    pub truncated: bool,
}

impl Unmarshall for PendingTaskCount {
    fn unmarshall(document: &Document) -> unmarshall::Result<Self> {
        Ok(Self {
            count: unmarshall::required(unmarshall::integer(document, "count")?, "count")?,
            truncated: unmarshall::boolean(document, "truncated")?.unwrap_or(false),
        })
    }
}
