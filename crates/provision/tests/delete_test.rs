/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

mod common;

use std::collections::BTreeSet;
use std::str::FromStr;

use ferrite_model::IpRecord;
use ferrite_network::Mac;
use ferrite_provision::{ProvisionError, StaticDirectory, delete_nic, get_nic, provision_nic};
use ferrite_store::{MemoryStore, ObjectStore, ip_bucket};
use ferrite_uuid::compute_node::ComputeNodeId;
use uuid::Uuid;

#[tokio::test]
async fn delete_unassigns_the_owned_address() -> eyre::Result<()> {
    let store = MemoryStore::new();
    let net = common::network("10.0.0.0/24", "10.0.0.10", "10.0.0.20");
    let dir = StaticDirectory::new().with_network(net.clone());
    let config = common::config();

    let mut params = common::on_network(Uuid::new_v4(), Uuid::new_v4(), &net);
    params.ip = Some(common::ip("10.0.0.10"));
    let allocated = provision_nic(&store, &dir, &config, params).await?;
    let mac = Mac::from_str(&allocated.nic.mac)?;

    let deleted = delete_nic(&store, mac).await?;
    assert_eq!(deleted.nic.mac, mac);

    let err = get_nic(&store, &dir, mac).await.unwrap_err();
    assert!(matches!(err, ProvisionError::NotFound { kind: "nic", .. }));

    // The record survives unbound: skipped by the next-free search, but
    // available to a caller naming it explicitly.
    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let record = IpRecord::from_object(&object)?;
    assert_eq!(record.belongs_to_uuid, None);
    assert_eq!(record.owner_uuid, None);
    assert!(!record.free);
    Ok(())
}

#[tokio::test]
async fn delete_leaves_a_reassigned_ip_alone() -> eyre::Result<()> {
    let store = MemoryStore::new();
    let net = common::network("10.0.0.0/24", "10.0.0.10", "10.0.0.20");
    let dir = StaticDirectory::new().with_network(net.clone());
    let config = common::config();

    let mut params = common::on_network(Uuid::new_v4(), Uuid::new_v4(), &net);
    params.ip = Some(common::ip("10.0.0.10"));
    let allocated = provision_nic(&store, &dir, &config, params).await?;
    let mac = Mac::from_str(&allocated.nic.mac)?;

    let usurper = Uuid::new_v4();
    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let mut record = IpRecord::from_object(&object)?;
    record.belongs_to_uuid = Some(usurper);
    store.commit(vec![record.batch()]).await?;

    delete_nic(&store, mac).await?;

    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let record = IpRecord::from_object(&object)?;
    assert_eq!(record.belongs_to_uuid, Some(usurper));
    Ok(())
}

#[tokio::test]
async fn delete_of_fabric_nic_reports_overlay_members() -> eyre::Result<()> {
    let store = MemoryStore::new();
    let net = common::fabric_network("10.2.0.0/24", "10.2.0.10", "10.2.0.20", 77);
    let dir = StaticDirectory::new().with_network(net.clone());
    let config = common::config();

    let cn1 = ComputeNodeId::new();
    let mut params = common::on_network(Uuid::new_v4(), Uuid::new_v4(), &net);
    params.cn_uuid = Some(cn1);
    let survivor = provision_nic(&store, &dir, &config, params).await?;

    let cn2 = ComputeNodeId::new();
    let mut params = common::on_network(Uuid::new_v4(), Uuid::new_v4(), &net);
    params.cn_uuid = Some(cn2);
    let doomed = provision_nic(&store, &dir, &config, params).await?;
    let doomed_mac = Mac::from_str(&doomed.nic.mac)?;
    let doomed_ip = doomed.nic.ip.expect("an IP was bound");

    let deleted = delete_nic(&store, doomed_mac).await?;
    // Membership is the snapshot at commit time: both nodes.
    assert_eq!(deleted.vnet_cns, BTreeSet::from([cn1, cn2]));

    // Its address is unassigned; the survivor's is untouched.
    let object = store
        .get(&ip_bucket(&net.uuid), &doomed_ip.to_string())
        .await?;
    assert_eq!(IpRecord::from_object(&object)?.belongs_to_uuid, None);

    let survivor_ip = survivor.nic.ip.expect("an IP was bound");
    let object = store
        .get(&ip_bucket(&net.uuid), &survivor_ip.to_string())
        .await?;
    assert_eq!(
        IpRecord::from_object(&object)?.belongs_to_uuid,
        Some(survivor.nic.belongs_to_uuid)
    );
    Ok(())
}

#[tokio::test]
async fn delete_of_missing_nic_is_not_found() {
    let store = MemoryStore::new();

    let err = delete_nic(&store, common::mac("90:b8:d0:ff:ff:ff"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::NotFound { kind: "nic", .. }));
}

#[tokio::test]
async fn freeing_a_free_address_is_a_no_op_commit() -> eyre::Result<()> {
    let store = MemoryStore::new();
    let net = common::network("10.0.0.0/24", "10.0.0.10", "10.0.0.20");

    let mut record = IpRecord::fresh(net.uuid, common::ip("10.0.0.10"));
    record.assign(&ferrite_model::IpOwnership {
        belongs_to_uuid: Uuid::new_v4(),
        belongs_to_type: ferrite_model::BelongsToType::Zone,
        owner_uuid: Uuid::new_v4(),
    });
    store.commit(vec![record.batch()]).await?;

    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let bound = IpRecord::from_object(&object)?;
    store.commit(vec![bound.free_batch()]).await?;

    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let freed = IpRecord::from_object(&object)?;
    assert!(freed.free);

    // Free again: the commit succeeds and changes nothing observable.
    store.commit(vec![freed.free_batch()]).await?;
    let object = store.get(&ip_bucket(&net.uuid), "10.0.0.10").await?;
    let still_freed = IpRecord::from_object(&object)?;
    assert!(still_freed.free);
    assert_eq!(still_freed.belongs_to_uuid, None);
    assert_eq!(still_freed.owner_uuid, None);
    Ok(())
}
