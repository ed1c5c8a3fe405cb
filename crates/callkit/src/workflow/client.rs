use dispatch::Outcome;

use crate::async_client::AsyncClient;
use crate::async_client::Call;
use crate::client::Client;
use crate::error::ClientError;
use crate::error::Result;

use super::*;

/// Blocking workflow client.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
}

impl WorkflowClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn register_domain(&self, input: &RegisterDomainInput) -> Result<()> {
        self.client.invoke(&REGISTER_DOMAIN, Some(input))
    }

    pub fn deprecate_domain(&self, input: &DeprecateDomainInput) -> Result<()> {
        self.client.invoke(&DEPRECATE_DOMAIN, Some(input))
    }

    pub fn describe_domain(&self, input: &DescribeDomainInput) -> Result<DomainDetail> {
        self.client.invoke(&DESCRIBE_DOMAIN, Some(input))
    }

    pub fn list_domains(&self, input: &ListDomainsInput) -> Result<DomainInfos> {
        self.client.invoke(&LIST_DOMAINS, Some(input))
    }

    pub fn count_pending_activity_tasks(&self, input: &CountPendingActivityTasksInput) -> Result<PendingTaskCount> {
        self.client.invoke(&COUNT_PENDING_ACTIVITY_TASKS, Some(input))
    }
}

/// Workflow client whose calls run on a dispatcher.
///
/// Every operation comes in two forms: `*_async` returns the call handle, and
/// `*_async_with` also notifies a callback when the call ends.
#[derive(Debug, Clone)]
pub struct WorkflowAsyncClient {
    inner: AsyncClient,
}

impl WorkflowAsyncClient {
    pub fn new(inner: AsyncClient) -> Self {
        Self { inner }
    }

    pub fn register_domain_async(&self, input: RegisterDomainInput) -> Result<Call<()>> {
        self.inner.invoke_async(&REGISTER_DOMAIN, input)
    }

    pub fn register_domain_async_with<C>(&self, input: RegisterDomainInput, callback: C) -> Result<Call<()>>
    where
        C: FnOnce(&Outcome<(), ClientError>) + Send + 'static,
    {
        self.inner.invoke_async_with(&REGISTER_DOMAIN, input, callback)
    }

    pub fn deprecate_domain_async(&self, input: DeprecateDomainInput) -> Result<Call<()>> {
        self.inner.invoke_async(&DEPRECATE_DOMAIN, input)
    }

    pub fn deprecate_domain_async_with<C>(&self, input: DeprecateDomainInput, callback: C) -> Result<Call<()>>
    where
        C: FnOnce(&Outcome<(), ClientError>) + Send + 'static,
    {
        self.inner.invoke_async_with(&DEPRECATE_DOMAIN, input, callback)
    }

    pub fn describe_domain_async(&self, input: DescribeDomainInput) -> Result<Call<DomainDetail>> {
        self.inner.invoke_async(&DESCRIBE_DOMAIN, input)
    }

    pub fn describe_domain_async_with<C>(&self, input: DescribeDomainInput, callback: C) -> Result<Call<DomainDetail>>
    where
        C: FnOnce(&Outcome<DomainDetail, ClientError>) + Send + 'static,
    {
        self.inner.invoke_async_with(&DESCRIBE_DOMAIN, input, callback)
    }

    pub fn list_domains_async(&self, input: ListDomainsInput) -> Result<Call<DomainInfos>> {
        self.inner.invoke_async(&LIST_DOMAINS, input)
    }

    pub fn list_domains_async_with<C>(&self, input: ListDomainsInput, callback: C) -> Result<Call<DomainInfos>>
    where
        C: FnOnce(&Outcome<DomainInfos, ClientError>) + Send + 'static,
    {
        self.inner.invoke_async_with(&LIST_DOMAINS, input, callback)
    }

    pub fn count_pending_activity_tasks_async(
        &self,
        input: CountPendingActivityTasksInput,
    ) -> Result<Call<PendingTaskCount>> {
        self.inner.invoke_async(&COUNT_PENDING_ACTIVITY_TASKS, input)
    }

    pub fn count_pending_activity_tasks_async_with<C>(
        &self,
        input: CountPendingActivityTasksInput,
        callback: C,
    ) -> Result<Call<PendingTaskCount>>
    where
        C: FnOnce(&Outcome<PendingTaskCount, ClientError>) + Send + 'static,
    {
        self.inner.invoke_async_with(&COUNT_PENDING_ACTIVITY_TASKS, input, callback)
    }

    /// Shuts down the dispatcher this client runs on.
    pub fn shutdown(&self) -> usize {
        self.inner.shutdown()
    }
}
