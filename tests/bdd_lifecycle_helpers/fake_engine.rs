//! In-memory container engine and host CLI for behavioural tests.
//!
//! State transitions follow the Docker-compatible API: starting a running
//! container answers 304, pausing a non-running one answers 409, and so on.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bollard::errors::Error as BollardError;
use podprobe::engine::{
    ContainerRecord, ContainerSpec, ContainerStatus, EngineClient, EngineFuture, ImageRecord,
};
use podprobe::host::{CommandFuture, CommandOutput, CommandRunner};

#[derive(Debug, Default)]
struct EngineState {
    images: Vec<ImageRecord>,
    containers: Vec<ContainerRecord>,
    minted: u64,
    ignore_pause: bool,
}

fn server_error(status_code: u16, message: String) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code,
        message,
    }
}

/// Expand a short reference the way the engine does: `alpine` becomes
/// `docker.io/library/alpine:latest`.
fn qualify(reference: &str) -> String {
    let (path, tag) = match reference.rsplit_once(':') {
        Some((path, tag)) if !tag.contains('/') => (path, tag),
        _ => (reference, "latest"),
    };
    if path.contains('/') {
        format!("{path}:{tag}")
    } else {
        format!("docker.io/library/{path}:{tag}")
    }
}

impl EngineState {
    fn mint_id(&mut self) -> String {
        self.minted += 1;
        format!("{:064x}", self.minted)
    }

    fn image(&self, reference: &str) -> Result<&ImageRecord, BollardError> {
        let qualified = qualify(reference);
        self.images
            .iter()
            .find(|image| image.id == reference || image.repo_tags.contains(&qualified))
            .ok_or_else(|| server_error(404, format!("no such image: {reference}")))
    }

    fn container_position(&self, name: &str) -> Result<usize, BollardError> {
        self.containers
            .iter()
            .position(|record| record.id == name || record.names.iter().any(|n| n == name))
            .ok_or_else(|| server_error(404, format!("no such container: {name}")))
    }

    fn container_mut(&mut self, name: &str) -> Result<&mut ContainerRecord, BollardError> {
        let position = self.container_position(name)?;
        self.containers
            .get_mut(position)
            .ok_or_else(|| server_error(500, String::from("container vanished")))
    }

    fn pull(&mut self, reference: &str) {
        if self.image(reference).is_err() {
            let id = self.mint_id();
            self.images.push(ImageRecord {
                id,
                repo_tags: vec![qualify(reference)],
            });
        }
    }

    fn remove_image(&mut self, reference: &str, force: bool) -> Result<(), BollardError> {
        let image = self.image(reference)?.clone();
        let in_use = self
            .containers
            .iter()
            .any(|record| image.repo_tags.contains(&record.image));
        if in_use && !force {
            return Err(server_error(
                409,
                format!("image {reference} is in use by a container"),
            ));
        }
        self.images.retain(|candidate| candidate.id != image.id);
        Ok(())
    }

    fn create(&mut self, spec: &ContainerSpec) -> Result<String, BollardError> {
        let image = self.image(&spec.image)?.repo_tags.first().cloned();
        if self.container_position(&spec.name).is_ok() {
            return Err(server_error(
                409,
                format!("container name {} is already in use", spec.name),
            ));
        }
        let id = self.mint_id();
        self.containers.push(ContainerRecord {
            id: id.clone(),
            names: vec![spec.name.clone()],
            image: image.unwrap_or_else(|| qualify(&spec.image)),
            status: ContainerStatus::Created,
        });
        Ok(id)
    }

    fn transition(
        &mut self,
        name: &str,
        from: &[ContainerStatus],
        to: ContainerStatus,
        unchanged: u16,
    ) -> Result<(), BollardError> {
        let ignore_pause = self.ignore_pause;
        let record = self.container_mut(name)?;
        if record.status == to {
            return Err(server_error(unchanged, format!("container already {to}")));
        }
        if !from.contains(&record.status) {
            return Err(server_error(
                409,
                format!("container is {}, cannot become {to}", record.status),
            ));
        }
        if !(ignore_pause && to == ContainerStatus::Paused) {
            record.status = to;
        }
        Ok(())
    }

    fn remove_container(&mut self, name: &str, force: bool) -> Result<(), BollardError> {
        let position = self.container_position(name)?;
        let active = self.containers.get(position).is_some_and(|record| {
            matches!(
                record.status,
                ContainerStatus::Running | ContainerStatus::Paused
            )
        });
        if active && !force {
            return Err(server_error(
                409,
                format!("cannot remove running container {name}"),
            ));
        }
        self.containers.remove(position);
        Ok(())
    }
}

/// Shared-state fake implementing [`EngineClient`].
///
/// Clones observe the same engine, so the janitor, the scenario session, and
/// the test assertions all see one set of resources.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer<T: Send + 'static>(
        &self,
        operation: impl FnOnce(&mut EngineState) -> Result<T, BollardError>,
    ) -> EngineFuture<'_, T> {
        let result = operation(&mut *self.lock());
        Box::pin(async move { result })
    }

    /// Accept pause requests without changing container state.
    pub(crate) fn ignore_pause(&self) {
        self.lock().ignore_pause = true;
    }

    /// Leave a running container behind, as an earlier run might have.
    pub(crate) fn seed_running(&self, name: &str, image: &str) -> Result<String, BollardError> {
        self.lock().pull(image);
        self.run_detached(&ContainerSpec {
            name: String::from(name),
            image: String::from(image),
            command: None,
        })
    }

    /// Create and start a container in one go, as `podman run -d` does.
    pub(crate) fn run_detached(&self, spec: &ContainerSpec) -> Result<String, BollardError> {
        let mut state = self.lock();
        let id = state.create(spec)?;
        state.transition(&id, &[ContainerStatus::Created], ContainerStatus::Running, 304)?;
        Ok(id)
    }

    pub(crate) fn container_count(&self) -> usize {
        self.lock().containers.len()
    }

    pub(crate) fn image_count(&self) -> usize {
        self.lock().images.len()
    }
}

impl EngineClient for FakeEngine {
    fn pull_image(&self, reference: &str) -> EngineFuture<'_, ()> {
        self.answer(|state| {
            state.pull(reference);
            Ok(())
        })
    }

    fn inspect_image(&self, reference: &str) -> EngineFuture<'_, ImageRecord> {
        self.answer(|state| state.image(reference).cloned())
    }

    fn list_images(&self) -> EngineFuture<'_, Vec<ImageRecord>> {
        self.answer(|state| Ok(state.images.clone()))
    }

    fn remove_image(&self, reference: &str, force: bool) -> EngineFuture<'_, ()> {
        self.answer(|state| state.remove_image(reference, force))
    }

    fn create_container(&self, spec: &ContainerSpec) -> EngineFuture<'_, String> {
        self.answer(|state| state.create(spec))
    }

    fn start_container(&self, name: &str) -> EngineFuture<'_, ()> {
        self.answer(|state| {
            state.transition(
                name,
                &[ContainerStatus::Created, ContainerStatus::Exited],
                ContainerStatus::Running,
                304,
            )
        })
    }

    fn inspect_container(&self, name: &str) -> EngineFuture<'_, ContainerRecord> {
        self.answer(|state| {
            let position = state.container_position(name)?;
            state
                .containers
                .get(position)
                .cloned()
                .ok_or_else(|| server_error(404, format!("no such container: {name}")))
        })
    }

    fn list_containers(&self) -> EngineFuture<'_, Vec<ContainerRecord>> {
        self.answer(|state| Ok(state.containers.clone()))
    }

    fn pause_container(&self, name: &str) -> EngineFuture<'_, ()> {
        self.answer(|state| {
            state.transition(
                name,
                &[ContainerStatus::Running],
                ContainerStatus::Paused,
                409,
            )
        })
    }

    fn unpause_container(&self, name: &str) -> EngineFuture<'_, ()> {
        self.answer(|state| {
            state.transition(
                name,
                &[ContainerStatus::Paused],
                ContainerStatus::Running,
                409,
            )
        })
    }

    fn stop_container(&self, name: &str, _grace_secs: i32) -> EngineFuture<'_, ()> {
        self.answer(|state| {
            state.transition(
                name,
                &[ContainerStatus::Running, ContainerStatus::Paused],
                ContainerStatus::Exited,
                304,
            )
        })
    }

    fn remove_container(&self, name: &str, force: bool) -> EngineFuture<'_, ()> {
        self.answer(|state| state.remove_container(name, force))
    }
}

/// Host CLI stand-in that understands `run -d --name NAME IMAGE CMD...`.
#[derive(Debug, Clone)]
pub(crate) struct FakeCli {
    engine: FakeEngine,
    invocations: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeCli {
    pub(crate) fn new(engine: FakeEngine) -> Self {
        Self {
            engine,
            invocations: Arc::default(),
        }
    }

    /// Argument lists of every invocation so far.
    pub(crate) fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn respond(&self, args: &[String]) -> CommandOutput {
        if args.first().map(String::as_str) != Some("run") {
            return CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            };
        }

        let mut rest = args.iter().skip_while(|arg| *arg != "--name").skip(1);
        let name = rest.next().cloned().unwrap_or_default();
        let image = rest.next().cloned().unwrap_or_default();
        let command: Vec<String> = rest.cloned().collect();
        let spec = ContainerSpec {
            name,
            image,
            command: (!command.is_empty()).then_some(command),
        };

        match self.engine.run_detached(&spec) {
            Ok(id) => CommandOutput {
                code: Some(0),
                stdout: format!("{id}\n"),
                stderr: String::new(),
            },
            Err(error) => CommandOutput {
                code: Some(125),
                stdout: String::new(),
                stderr: format!("Error: {error}\n"),
            },
        }
    }
}

impl CommandRunner for FakeCli {
    fn run(&self, _program: &str, args: &[String]) -> CommandFuture<'_> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.to_vec());
        let output = self.respond(args);
        Box::pin(async move { Ok(output) })
    }
}
