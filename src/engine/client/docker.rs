//! [`EngineClient`] implementation for the `Bollard` Docker client.

use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerInspectResponse, ContainerSummary};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, InspectContainerOptions,
    ListContainersOptionsBuilder, ListImagesOptions, RemoveContainerOptionsBuilder,
    RemoveImageOptionsBuilder, StartContainerOptions, StopContainerOptionsBuilder,
};
use futures_util::TryStreamExt;

use super::{
    ContainerRecord, ContainerSpec, ContainerStatus, EngineClient, EngineFuture, ImageRecord,
};

const DIGEST_PREFIX: &str = "sha256:";

fn strip_digest_prefix(id: &str) -> String {
    id.strip_prefix(DIGEST_PREFIX).unwrap_or(id).to_owned()
}

fn trim_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim_start_matches('/').to_owned())
        .collect()
}

/// Split `registry/repo:tag` into the repository and tag halves.
///
/// A colon inside the registry host (`host:5000/repo`) is not a tag separator.
fn split_reference(reference: &str) -> (&str, &str) {
    match reference.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, tag),
        _ => (reference, "latest"),
    }
}

fn container_from_summary(summary: ContainerSummary) -> ContainerRecord {
    ContainerRecord {
        id: summary.id.unwrap_or_default(),
        names: trim_names(summary.names.unwrap_or_default()),
        image: summary.image.unwrap_or_default(),
        status: summary
            .state
            .map_or(ContainerStatus::Unknown, |state| {
                ContainerStatus::from_engine(&state.to_string())
            }),
    }
}

fn container_from_inspect(response: ContainerInspectResponse) -> ContainerRecord {
    let status = response
        .state
        .and_then(|state| state.status)
        .map_or(ContainerStatus::Unknown, |status| {
            ContainerStatus::from_engine(&status.to_string())
        });
    ContainerRecord {
        id: response.id.unwrap_or_default(),
        names: trim_names(response.name.into_iter().collect()),
        image: response
            .config
            .and_then(|config| config.image)
            .unwrap_or_default(),
        status,
    }
}

impl EngineClient for Docker {
    fn pull_image(&self, reference: &str) -> EngineFuture<'_, ()> {
        let (repo, tag) = split_reference(reference);
        let options = CreateImageOptionsBuilder::new()
            .from_image(repo)
            .tag(tag)
            .build();
        Box::pin(async move {
            self.create_image(Some(options), None, None)
                .try_for_each(|_progress| async { Ok(()) })
                .await
        })
    }

    fn inspect_image(&self, reference: &str) -> EngineFuture<'_, ImageRecord> {
        let owned_reference = reference.to_owned();
        Box::pin(async move {
            let inspect = Self::inspect_image(self, &owned_reference).await?;
            Ok(ImageRecord {
                id: strip_digest_prefix(inspect.id.as_deref().unwrap_or_default()),
                repo_tags: inspect.repo_tags.unwrap_or_default(),
            })
        })
    }

    fn list_images(&self) -> EngineFuture<'_, Vec<ImageRecord>> {
        Box::pin(async move {
            let summaries = Self::list_images(self, None::<ListImagesOptions>).await?;
            Ok(summaries
                .into_iter()
                .map(|summary| ImageRecord {
                    id: strip_digest_prefix(&summary.id),
                    repo_tags: summary.repo_tags,
                })
                .collect())
        })
    }

    fn remove_image(&self, reference: &str, force: bool) -> EngineFuture<'_, ()> {
        let owned_reference = reference.to_owned();
        let options = RemoveImageOptionsBuilder::new().force(force).build();
        Box::pin(async move {
            Self::remove_image(self, &owned_reference, Some(options), None).await?;
            Ok(())
        })
    }

    fn create_container(&self, spec: &ContainerSpec) -> EngineFuture<'_, String> {
        let options = CreateContainerOptionsBuilder::new().name(&spec.name).build();
        let body = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            ..ContainerCreateBody::default()
        };
        Box::pin(async move {
            let response = Self::create_container(self, Some(options), body).await?;
            Ok(response.id)
        })
    }

    fn start_container(&self, name: &str) -> EngineFuture<'_, ()> {
        let owned_name = name.to_owned();
        Box::pin(async move {
            Self::start_container(self, &owned_name, None::<StartContainerOptions>).await
        })
    }

    fn inspect_container(&self, name: &str) -> EngineFuture<'_, ContainerRecord> {
        let owned_name = name.to_owned();
        Box::pin(async move {
            let response =
                Self::inspect_container(self, &owned_name, None::<InspectContainerOptions>).await?;
            Ok(container_from_inspect(response))
        })
    }

    fn list_containers(&self) -> EngineFuture<'_, Vec<ContainerRecord>> {
        let options = ListContainersOptionsBuilder::new().all(true).build();
        Box::pin(async move {
            let summaries = Self::list_containers(self, Some(options)).await?;
            Ok(summaries.into_iter().map(container_from_summary).collect())
        })
    }

    fn pause_container(&self, name: &str) -> EngineFuture<'_, ()> {
        let owned_name = name.to_owned();
        Box::pin(async move { Self::pause_container(self, &owned_name).await })
    }

    fn unpause_container(&self, name: &str) -> EngineFuture<'_, ()> {
        let owned_name = name.to_owned();
        Box::pin(async move { Self::unpause_container(self, &owned_name).await })
    }

    fn stop_container(&self, name: &str, grace_secs: i32) -> EngineFuture<'_, ()> {
        let owned_name = name.to_owned();
        let options = StopContainerOptionsBuilder::new().t(grace_secs).build();
        Box::pin(async move { Self::stop_container(self, &owned_name, Some(options)).await })
    }

    fn remove_container(&self, name: &str, force: bool) -> EngineFuture<'_, ()> {
        let owned_name = name.to_owned();
        let options = RemoveContainerOptionsBuilder::new().force(force).build();
        Box::pin(async move { Self::remove_container(self, &owned_name, Some(options)).await })
    }
}
