use crate::dns::Resolver;
use crate::error::Error;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use tokio::net::UdpSocket;
use trust_dns_client::client::{AsyncClient, ClientHandle};
use trust_dns_client::rr::{DNSClass, Name, RData, Record, RecordType};
use trust_dns_client::udp::UdpClientStream;

/// [`Resolver`] sending its `A` queries over UDP to one recursive DNS server (`1.1.1.1:53` in
/// the default [`Config`][crate::config::Config]).
#[derive(Debug, Clone, Copy)]
pub struct TrustDnsResolver {
    dns_server: SocketAddr,
}

impl TrustDnsResolver {
    #[must_use]
    pub fn new(dns_server: SocketAddr) -> Self {
        Self { dns_server }
    }
}

#[async_trait::async_trait]
impl Resolver for TrustDnsResolver {
    async fn resolve_a(&self, domain_name: &str) -> Result<Option<Ipv4Addr>, Error> {
        let name = Name::from_str(&format!("{domain_name}."))?;
        let stream = UdpClientStream::<UdpSocket>::new(self.dns_server);
        let (mut client, background) = AsyncClient::connect(stream).await?;
        let exchange = tokio::spawn(background);

        // Queries built by the client handle have recursion desired set.
        let response = client.query(name, DNSClass::IN, RecordType::A).await;
        exchange.abort();
        let response = response?;

        tracing::debug!(
            "{} answered {} record(s) for {domain_name}",
            self.dns_server,
            response.answers().len()
        );
        Ok(first_a(response.answers()))
    }

    async fn lookup_a(&self, domain_name: &str) -> Result<Vec<IpAddr>, Error> {
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in tokio::net::lookup_host((domain_name, 0)).await? {
            let ip = addr.ip();
            if ip.is_ipv4() && !ips.contains(&ip) {
                ips.push(ip);
            }
        }
        Ok(ips)
    }
}

/// The address of the first answer, if that answer is an `A` record. Later answers are never
/// looked at, so a CNAME first (as CloudFront hosts usually answer) gives `None`.
fn first_a(answers: &[Record]) -> Option<Ipv4Addr> {
    match answers.first().and_then(Record::data) {
        Some(RData::A(ip)) => Some(*ip),
        _ => None,
    }
}
