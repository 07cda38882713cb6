//! # Gateway Flows
//!
//! The read/write flows an application runs against the contract: the
//! dashboard startup reads, the degraded per-index location fetch, and a
//! report round trip.

#[cfg(test)]
mod tests {
    use ow_contract_gateway::{MockContractGateway, OutbreakContract};
    use serde_json::json;
    use shared_types::{AccountId, ContractAddress, LedgerError, Location, NetworkId};

    fn signer() -> AccountId {
        AccountId("0xoperator".into())
    }

    #[tokio::test]
    async fn test_dashboard_startup_reads() {
        let mock = MockContractGateway::new();
        mock.set_address(ContractAddress(
            "0xa064c7c657F4Da33C6F99766488cE133c2d8B18E".into(),
        ));
        mock.stub("getInfectedCount", json!("8"));
        mock.stub(
            "getAllOutbreakLocations",
            json!({
                "locations": ["35.6895,139.6917", "40.7128,-74.0060"],
                "counts": ["5", "3"],
            }),
        );

        let contract = OutbreakContract::connect(mock, NetworkId(11_155_111), signer())
            .await
            .expect("resolution must succeed");

        assert_eq!(contract.infected_count().await.unwrap(), 8);
        let locations = contract.outbreak_locations().await.unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].infected_count, 5);
        // Coordinates survive the round trip as parseable pairs.
        assert!(locations
            .iter()
            .all(|l| l.location.coordinates().is_some()));
    }

    #[tokio::test]
    async fn test_degraded_node_still_lists_locations() {
        let mock = MockContractGateway::new();
        mock.stub_error(
            "getAllOutbreakLocations",
            LedgerError::Rpc {
                method: "getAllOutbreakLocations".into(),
                reason: "execution reverted".into(),
            },
        );
        mock.stub("getOutbreakLocationsCount", json!(1));
        mock.stub(
            "outbreakLocations",
            json!({
                "location": "48.8566,2.3522",
                "infectedCount": 4,
                "timestamp": 1_700_000_000u64,
            }),
        );

        let contract = OutbreakContract::with_address(
            mock,
            ContractAddress("0xa064c7c657F4Da33C6F99766488cE133c2d8B18E".into()),
            signer(),
        );

        let locations = contract.outbreak_locations().await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].observed_at, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_report_then_proximity_round_trip() {
        let mock = MockContractGateway::new();
        mock.stub(
            "checkProximity",
            json!([true, "35.6895,139.6917", 6, 1]),
        );

        let contract = OutbreakContract::with_address(
            mock,
            ContractAddress("0x07766a4f028C91e307446d0Ba424f5efa1110819".into()),
            signer(),
        );

        let receipt = contract
            .report_infection(
                &AccountId("0xpatient".into()),
                &Location("35.6895,139.6917".into()),
                true,
            )
            .await
            .unwrap();
        assert!(receipt.tx_hash.starts_with("0x"));

        let proximity = contract
            .check_proximity(&Location("35.6900,139.6920".into()))
            .await
            .unwrap();
        assert!(proximity.is_near_outbreak);
        assert_eq!(proximity.infected_count, 6);
    }
}
