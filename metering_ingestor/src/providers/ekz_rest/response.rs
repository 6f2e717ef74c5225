//! Wire-format structs for the portal's JSON responses.
//!
//! Field names follow the portal schema (a German SAP billing backend leaks
//! through: `anlage` = installation, `einzdat`/`auszdat` = move-in/move-out,
//! `vstelle` = service point).

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::{
    installation::Installation,
    reading::{ConsumptionData, Reading, ReadingStatus, Tariff, TariffSeries},
};
use crate::providers::ProviderError;

/// Response of `installation-selection-data?installationVariant=CONSUMPTION`.
#[derive(Deserialize, Debug)]
pub struct ApiInstallationSelectionData {
    #[serde(default)]
    pub contracts: Vec<ApiContract>,
    #[serde(default)]
    pub evbs: Vec<ApiServicePoint>,
}

/// One contract row.
#[derive(Deserialize, Debug)]
pub struct ApiContract {
    pub anlage: String,
    pub einzdat: String,
    pub auszdat: Option<String>,
    pub vstelle: String,
}

/// Service point carrying the address for a contract's `vstelle`.
#[derive(Deserialize, Debug)]
pub struct ApiServicePoint {
    pub vstelle: String,
    pub address: Option<ApiAddress>,
}

/// Postal address of a service point.
#[derive(Deserialize, Debug)]
pub struct ApiAddress {
    pub street: String,
    #[serde(rename = "houseNumber")]
    pub house_number: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub city: String,
}

/// Response of `consumption-data?installationId=...`.
///
/// Consumption readings live in `seriesNt`/`seriesHt`; the `seriesNetz*`
/// variants carry grid-fee series this client does not aggregate.
#[derive(Deserialize, Debug, Default)]
pub struct ApiConsumptionData {
    pub series: Option<ApiSeries>,
    #[serde(rename = "seriesHt")]
    pub series_ht: Option<ApiSeries>,
    #[serde(rename = "seriesNt")]
    pub series_nt: Option<ApiSeries>,
    #[serde(rename = "seriesNetz")]
    pub series_netz: Option<ApiSeries>,
    #[serde(rename = "seriesNetzHt")]
    pub series_netz_ht: Option<ApiSeries>,
}

/// One series of values over the requested window.
#[derive(Deserialize, Debug)]
pub struct ApiSeries {
    pub level: Option<String>,
    #[serde(rename = "tariffType")]
    pub tariff_type: Option<String>,
    pub ab: Option<String>,
    pub bis: Option<String>,
    #[serde(default)]
    pub values: Vec<ApiValue>,
}

/// One reading slot.
#[derive(Deserialize, Debug)]
pub struct ApiValue {
    pub value: f64,
    pub timestamp: i64,
    pub date: String,
    pub time: String,
    pub status: ReadingStatus,
}

impl ApiInstallationSelectionData {
    /// Maps the wire response to the canonical installation list, joining
    /// addresses from the service-point records.
    pub fn into_installations(self) -> Result<Vec<Installation>, ProviderError> {
        let addresses: IndexMap<String, String> = self
            .evbs
            .into_iter()
            .filter_map(|sp| {
                let a = sp.address?;
                Some((
                    sp.vstelle,
                    format!(
                        "{} {}, {} {}",
                        a.street, a.house_number, a.postal_code, a.city
                    ),
                ))
            })
            .collect();

        self.contracts
            .into_iter()
            .map(|c| {
                let contract_start = parse_api_date(&c.einzdat)?;
                let contract_end = c.auszdat.as_deref().map(parse_api_date).transpose()?;
                Ok(Installation {
                    address: addresses.get(&c.vstelle).cloned(),
                    id: c.anlage,
                    contract_start,
                    contract_end,
                })
            })
            .collect()
    }
}

fn parse_api_date(s: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| ProviderError::Internal(format!("unparseable portal date '{s}': {e}")))
}

impl ApiConsumptionData {
    /// Maps the wire response to the canonical model.
    ///
    /// NT is listed before HT so that NT wins equal-timestamp ties in the
    /// downstream dedup pass, matching the portal client's historic order.
    pub fn into_canonical(self) -> ConsumptionData {
        let mut series = Vec::new();
        if let Some(s) = self.series_nt {
            series.push(s.into_tariff_series(Tariff::Nt));
        }
        if let Some(s) = self.series_ht {
            series.push(s.into_tariff_series(Tariff::Ht));
        }
        ConsumptionData { series }
    }
}

impl ApiSeries {
    fn into_tariff_series(self, tariff: Tariff) -> TariffSeries {
        let readings = self
            .values
            .into_iter()
            .map(|v| Reading {
                value: v.value,
                timestamp: v.timestamp,
                date: v.date,
                time: v.time,
                status: v.status,
                tariff,
            })
            .collect();
        TariffSeries { tariff, readings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installations_map_with_addresses() {
        let json = r#"{
            "contracts": [
                {"anlage": "4711", "einzdat": "2022-04-01", "auszdat": null, "vstelle": "V1"},
                {"anlage": "0815", "einzdat": "2018-01-15", "auszdat": "2022-03-31", "vstelle": "V2"}
            ],
            "evbs": [
                {"vstelle": "V1", "address": {"street": "Bahnhofstrasse", "houseNumber": "7",
                 "postalCode": "8001", "city": "Zürich"}}
            ],
            "fkkvkp": []
        }"#;
        let data: ApiInstallationSelectionData = serde_json::from_str(json).unwrap();
        let installations = data.into_installations().unwrap();

        assert_eq!(installations.len(), 2);
        assert_eq!(installations[0].id, "4711");
        assert!(installations[0].is_active());
        assert_eq!(
            installations[0].address.as_deref(),
            Some("Bahnhofstrasse 7, 8001 Zürich")
        );
        assert_eq!(
            installations[1].contract_end,
            Some(NaiveDate::from_ymd_opt(2022, 3, 31).unwrap())
        );
        assert_eq!(installations[1].address, None);
    }

    #[test]
    fn bad_contract_date_is_an_internal_error() {
        let json = r#"{"contracts": [{"anlage": "1", "einzdat": "01.04.2022",
                        "auszdat": null, "vstelle": "V1"}], "evbs": []}"#;
        let data: ApiInstallationSelectionData = serde_json::from_str(json).unwrap();
        let err = data.into_installations().unwrap_err();
        assert!(matches!(err, ProviderError::Internal(_)));
    }

    #[test]
    fn consumption_maps_nt_before_ht() {
        let json = r#"{
            "seriesHt": {"level": "PK_VERB_15MIN", "tariffType": "HT", "ab": "2024-06-15",
                "bis": "2024-06-15", "values": [
                {"value": 0.5, "timestamp": 20240615101500, "date": "2024-06-15",
                 "time": "10:15:00", "status": "VALID"}]},
            "seriesNt": {"level": "PK_VERB_15MIN", "tariffType": "NT", "ab": "2024-06-15",
                "bis": "2024-06-15", "values": [
                {"value": 0.25, "timestamp": 20240615101500, "date": "2024-06-15",
                 "time": "10:15:00", "status": "VALID"}]},
            "seriesNetz": null
        }"#;
        let data: ApiConsumptionData = serde_json::from_str(json).unwrap();
        let canonical = data.into_canonical();

        assert_eq!(canonical.series.len(), 2);
        assert_eq!(canonical.series[0].tariff, Tariff::Nt);
        assert_eq!(canonical.series[1].tariff, Tariff::Ht);
        assert_eq!(canonical.series[0].readings[0].tariff, Tariff::Nt);
        assert_eq!(canonical.usable_count(), 2);
    }

    #[test]
    fn absent_series_map_to_empty_data() {
        let data: ApiConsumptionData = serde_json::from_str("{}").unwrap();
        let canonical = data.into_canonical();
        assert!(canonical.series.is_empty());
        assert_eq!(canonical.usable_count(), 0);
    }
}
