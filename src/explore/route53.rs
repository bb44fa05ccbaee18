use crate::error::Error;
use crate::inventory::{HostedZone, Inventory};
use crate::mapping::NONE;

/// Look up the Route53 record named after `domain_name` in the hosted zone of
/// `registered_domain`.
///
/// Returns the record's fully qualified name (`dev.sokker.info.`), or [`NONE`] when the zone
/// isn't uniquely identified, the record doesn't exist or Route53 can't be queried.
pub async fn find_record(
    inventory: &(dyn Inventory + Send + Sync),
    registered_domain: &str,
    domain_name: &str,
) -> String {
    match lookup(inventory, registered_domain, domain_name).await {
        Ok(Some(record)) => {
            tracing::info!("found Route53 record {record}");
            record
        }
        Ok(None) => {
            tracing::info!("no Route53 record for {domain_name}");
            NONE.to_string()
        }
        Err(err) => {
            tracing::warn!("Route53 lookup for {domain_name} failed: {err}");
            NONE.to_string()
        }
    }
}

async fn lookup(
    inventory: &(dyn Inventory + Send + Sync),
    registered_domain: &str,
    domain_name: &str,
) -> Result<Option<String>, Error> {
    let zones = inventory.hosted_zones_by_name(registered_domain).await?;
    // The listing starts at the requested name and runs on through every later zone.
    let zones: Vec<&HostedZone> = zones
        .iter()
        .filter(|zone| zone_is(zone, registered_domain))
        .collect();
    let [zone] = zones.as_slice() else {
        tracing::debug!(
            "{} hosted zones named {registered_domain}, expected exactly one",
            zones.len()
        );
        return Ok(None);
    };

    let wanted = format!("{domain_name}.");
    let names = inventory.record_set_names(&zone.id).await?;
    Ok(names.into_iter().find(|name| *name == wanted))
}

fn zone_is(zone: &HostedZone, domain: &str) -> bool {
    zone.name
        .trim_end_matches('.')
        .eq_ignore_ascii_case(domain.trim_end_matches('.'))
}
